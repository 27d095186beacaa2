/// Insertion-ordered argument map
///
/// Route arguments are keyed by placeholder name and may be unset (`None`),
/// which is how an absent optional placeholder is represented. Order is the
/// order of first insertion; it decides the layout of generated query strings.
///
/// # Examples
///
/// ```
/// use reverse_router::Arguments;
///
/// let args = Arguments::new().with("foo", "foo").with("bar", 123);
/// assert_eq!(args.get("bar"), Some("123"));
///
/// let keys: Vec<&str> = args.iter().map(|(k, _)| k).collect();
/// assert_eq!(keys, vec!["foo", "bar"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    entries: Vec<(String, Option<String>)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a value (builder style)
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set(name, Some(value.to_string()));
        self
    }

    /// Adds or replaces an entry with an unset value (builder style)
    pub fn with_unset(mut self, name: impl Into<String>) -> Self {
        self.set(name, None);
        self
    }

    /// Sets a value; an existing entry keeps its position
    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// The value for `name`, `None` when missing or unset
    pub fn get(&self, name: &str) -> Option<&str> {
        self.lookup(name).flatten()
    }

    /// Distinguishes a missing entry (`None`) from an unset one (`Some(None)`)
    pub fn lookup(&self, name: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Option<String>> {
        let idx = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    /// Copies every entry of `other` over this map
    pub fn overlay(&mut self, other: &Arguments) {
        for (key, value) in &other.entries {
            self.set(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Arguments
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Arguments::new(), |args, (key, value)| args.with(key, value))
    }
}
