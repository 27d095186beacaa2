/// Template scanner
///
/// Walks a template left to right, accumulating literal text and placeholder
/// tokens into a [`ParseState`]. Grammar:
///
/// - literal text: any character except `{`, `}`, `(`, `)`
/// - required placeholder: `{name}` or `{name:regex}`
/// - optional placeholder: `({name}literal)` or `({name:regex}literal)`
///
/// Optional groups hold exactly one placeholder and never nest.

use std::iter::Peekable;
use std::str::Chars;

use regex::Regex;

use super::{CompiledPattern, PatternSegment, PlaceholderSpec, DEFAULT_REQUIREMENT};
use crate::error::{Result, RouteError};

/// Internal state accumulator for the scanner
#[derive(Default)]
struct ParseState {
    segments: Vec<PatternSegment>,
    placeholders: Vec<PlaceholderSpec>,
    literal: String,
}

impl ParseState {
    fn flush_literal(&mut self) {
        if !self.literal.is_empty() {
            let text = std::mem::take(&mut self.literal);
            self.segments.push(PatternSegment::Literal(text));
        }
    }

    fn push_placeholder(&mut self, template: &str, spec: PlaceholderSpec) -> Result<()> {
        if self.placeholders.iter().any(|p| p.name == spec.name) {
            return Err(RouteError::pattern(
                template,
                format!("placeholder `{}` appears more than once", spec.name),
            ));
        }

        self.flush_literal();
        self.segments
            .push(PatternSegment::Placeholder(self.placeholders.len()));
        self.placeholders.push(spec);
        Ok(())
    }

    fn finish(mut self, template: &str) -> CompiledPattern {
        self.flush_literal();
        CompiledPattern::new(template.to_string(), self.segments, self.placeholders)
    }
}

/// Compiles a route template
///
/// # Examples
///
/// ```
/// use reverse_router::pattern::compile;
///
/// let pattern = compile(r"/foo/{bar:\d}/({yada:\w}/)").unwrap();
///
/// let bar = &pattern.placeholders()[0];
/// assert_eq!(bar.name, "bar");
/// assert_eq!(bar.requirement, r"\d");
/// assert!(!bar.optional);
///
/// let yada = &pattern.placeholders()[1];
/// assert!(yada.optional);
/// assert_eq!(yada.trailing_literal, "/");
///
/// // A requirement may not end in a quantifier
/// assert!(compile("/foo/{bar:.+}").is_err());
/// ```
pub fn compile(template: &str) -> Result<CompiledPattern> {
    let mut state = ParseState::default();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let (name, requirement) = parse_placeholder(template, &mut chars)?;
                state.push_placeholder(template, PlaceholderSpec::required(name, requirement))?;
            }
            '(' => {
                if chars.next() != Some('{') {
                    return Err(RouteError::pattern(
                        template,
                        "an optional group must start with a placeholder",
                    ));
                }
                let (name, requirement) = parse_placeholder(template, &mut chars)?;
                let trailing = parse_trailing_literal(template, &mut chars)?;
                state.push_placeholder(
                    template,
                    PlaceholderSpec::optional(name, requirement, trailing),
                )?;
            }
            ')' | '}' => {
                return Err(RouteError::pattern(template, format!("unbalanced `{c}`")));
            }
            _ => state.literal.push(c),
        }
    }

    Ok(state.finish(template))
}

/// Parses `name}` or `name:regex}` after the opening brace
fn parse_placeholder(template: &str, chars: &mut Peekable<Chars<'_>>) -> Result<(String, String)> {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }

    if name.is_empty() {
        return Err(RouteError::pattern(template, "placeholder without a name"));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(RouteError::pattern(
            template,
            format!("placeholder name `{name}` must not start with a digit"),
        ));
    }

    match chars.next() {
        Some('}') => Ok((name, DEFAULT_REQUIREMENT.to_string())),
        Some(':') => {
            let requirement = parse_requirement(template, &name, chars)?;
            Ok((name, requirement))
        }
        _ => Err(RouteError::pattern(
            template,
            format!("unterminated placeholder `{name}`"),
        )),
    }
}

/// Reads a requirement up to the brace closing the placeholder. Braces inside
/// the regex (`\d{4}`) are balanced, escaped characters are taken verbatim.
fn parse_requirement(
    template: &str,
    name: &str,
    chars: &mut Peekable<Chars<'_>>,
) -> Result<String> {
    let mut requirement = String::new();
    let mut depth = 0usize;
    let mut escaped = false;

    for c in chars.by_ref() {
        if escaped {
            requirement.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                requirement.push(c);
            }
            '{' => {
                depth += 1;
                requirement.push(c);
            }
            '}' if depth == 0 => {
                check_requirement(template, name, &requirement)?;
                return Ok(requirement);
            }
            '}' => {
                depth -= 1;
                requirement.push(c);
            }
            _ => requirement.push(c),
        }
    }

    Err(RouteError::pattern(
        template,
        format!("unterminated placeholder `{name}`"),
    ))
}

/// Reads the literal between an optional placeholder and its closing paren
fn parse_trailing_literal(template: &str, chars: &mut Peekable<Chars<'_>>) -> Result<String> {
    let mut literal = String::new();

    for c in chars.by_ref() {
        match c {
            ')' => return Ok(literal),
            '{' | '(' => {
                return Err(RouteError::pattern(
                    template,
                    "optional groups hold a single placeholder and cannot nest",
                ));
            }
            '}' => return Err(RouteError::pattern(template, "unbalanced `}`")),
            _ => literal.push(c),
        }
    }

    Err(RouteError::pattern(template, "unterminated optional group"))
}

/// Validates a requirement fragment for placeholder `name`
///
/// The fragment must be non-empty, must not end in an unescaped quantifier
/// (the compiler appends its own) and must compile as a regex.
pub(crate) fn check_requirement(template: &str, name: &str, requirement: &str) -> Result<()> {
    if requirement.is_empty() {
        return Err(RouteError::pattern(
            template,
            format!("placeholder `{name}` has an empty requirement"),
        ));
    }
    if ends_with_quantifier(requirement) {
        return Err(RouteError::pattern(
            template,
            format!("requirement `{requirement}` of `{name}` must not end with a quantifier"),
        ));
    }

    Regex::new(&format!("^(?:{requirement})+$")).map_err(|err| {
        RouteError::pattern(
            template,
            format!("requirement `{requirement}` of `{name}` is not a valid regex: {err}"),
        )
    })?;

    Ok(())
}

fn ends_with_quantifier(requirement: &str) -> bool {
    let Some(last) = requirement.chars().last() else {
        return false;
    };
    if !matches!(last, '+' | '*' | '?') {
        return false;
    }

    let backslashes = requirement[..requirement.len() - 1]
        .chars()
        .rev()
        .take_while(|&c| c == '\\')
        .count();
    backslashes % 2 == 0
}
