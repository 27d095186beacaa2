/// Compiled route templates
///
/// A template such as `/blog/{year:\d}/({page:\d}/)` is compiled once into a
/// [`CompiledPattern`]: literal segments interleaved with placeholder markers
/// that index into an ordered list of [`PlaceholderSpec`]s. The same data
/// drives both the matching regex and URL reconstruction, so the two
/// directions can never disagree about the grammar.
///
/// Compilation is a pure function: the same template always yields an equal
/// `CompiledPattern`.

pub mod parser;

pub use parser::compile;

/// Requirement used by `{name}` placeholders that carry no explicit regex
pub const DEFAULT_REQUIREMENT: &str = r"[a-z0-9\-._]";

/// One named hole in a route template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSpec {
    /// Placeholder name, unique within its pattern
    pub name: String,
    /// Regex fragment a single value unit must match (no trailing quantifier)
    pub requirement: String,
    /// Written as `({name}literal)`
    pub optional: bool,
    /// Literal emitted only when an optional placeholder has a value
    pub trailing_literal: String,
}

impl PlaceholderSpec {
    pub fn required(name: impl Into<String>, requirement: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requirement: requirement.into(),
            optional: false,
            trailing_literal: String::new(),
        }
    }

    pub fn optional(
        name: impl Into<String>,
        requirement: impl Into<String>,
        trailing_literal: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            requirement: requirement.into(),
            optional: true,
            trailing_literal: trailing_literal.into(),
        }
    }
}

/// Piece of a compiled template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Text copied verbatim into generated URLs
    Literal(String),
    /// Index into [`CompiledPattern::placeholders`]
    Placeholder(usize),
}

/// A parsed route template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    template: String,
    segments: Vec<PatternSegment>,
    placeholders: Vec<PlaceholderSpec>,
}

impl CompiledPattern {
    pub(crate) fn new(
        template: String,
        segments: Vec<PatternSegment>,
        placeholders: Vec<PlaceholderSpec>,
    ) -> Self {
        Self {
            template,
            segments,
            placeholders,
        }
    }

    /// The template this pattern was compiled from
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    /// Placeholders in template order
    pub fn placeholders(&self) -> &[PlaceholderSpec] {
        &self.placeholders
    }

    pub fn placeholder(&self, name: &str) -> Option<&PlaceholderSpec> {
        self.position(name).map(|idx| &self.placeholders[idx])
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.placeholders.iter().position(|p| p.name == name)
    }

    pub fn has_placeholder(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Renders the template with every placeholder token (including the
    /// parentheses and trailing literal of optional ones) replaced by its
    /// `{index}` marker
    ///
    /// # Examples
    ///
    /// ```
    /// use reverse_router::pattern::compile;
    ///
    /// let pattern = compile(r"/foo/{bar:\d}/({yada:\w}/)").unwrap();
    /// assert_eq!(pattern.skeleton(), "/foo/{0}/{1}");
    /// ```
    pub fn skeleton(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                PatternSegment::Literal(text) => text.clone(),
                PatternSegment::Placeholder(idx) => format!("{{{idx}}}"),
            })
            .collect()
    }
}
