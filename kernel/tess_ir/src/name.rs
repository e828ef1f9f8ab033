//! Qualified object names (`schema.table.column`, `schema.function`).

use std::fmt;

/// A dot-separated, possibly qualified, object name.
///
/// Comparison is exact; case-insensitive matching is a policy of the
/// evaluation context and goes through [`ObjectName::matches`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectName {
    parts: Vec<String>,
}

impl ObjectName {
    /// The `*` name used by `COUNT(*)` and `SELECT *`.
    pub const GLOB: &'static str = "*";

    /// Create an unqualified name.
    pub fn new(name: impl Into<String>) -> Self {
        ObjectName {
            parts: vec![name.into()],
        }
    }

    /// Create a name qualified by `parent`.
    pub fn qualified(parent: &ObjectName, name: impl Into<String>) -> Self {
        let mut parts = parent.parts.clone();
        parts.push(name.into());
        ObjectName { parts }
    }

    /// Split dotted text into a name. No quoting rules apply.
    pub fn parse(text: &str) -> Self {
        ObjectName {
            parts: text.split('.').map(str::to_owned).collect(),
        }
    }

    /// The `*` name.
    pub fn glob() -> Self {
        ObjectName::new(Self::GLOB)
    }

    /// The last (unqualified) part.
    pub fn name(&self) -> &str {
        self.parts.last().map_or("", String::as_str)
    }

    /// Everything but the last part, if qualified.
    pub fn parent(&self) -> Option<ObjectName> {
        match self.parts.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(ObjectName {
                parts: rest.to_vec(),
            }),
            _ => None,
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Full dotted form.
    pub fn full_name(&self) -> String {
        self.parts.join(".")
    }

    /// `true` when this is the bare `*` name.
    pub fn is_glob(&self) -> bool {
        self.parts.len() == 1 && self.parts[0] == Self::GLOB
    }

    /// Compare under the given case policy.
    pub fn matches(&self, other: &ObjectName, ignore_case: bool) -> bool {
        self.parts.len() == other.parts.len()
            && self.parts.iter().zip(&other.parts).all(|(a, b)| {
                if ignore_case {
                    a.eq_ignore_ascii_case(b)
                } else {
                    a == b
                }
            })
    }
}

impl From<&str> for ObjectName {
    fn from(text: &str) -> Self {
        ObjectName::parse(text)
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_qualified() {
        let name = ObjectName::parse("app.sales.total");
        assert_eq!(name.name(), "total");
        assert_eq!(name.parent(), Some(ObjectName::parse("app.sales")));
        assert_eq!(name.to_string(), "app.sales.total");
    }

    #[test]
    fn test_unqualified_has_no_parent() {
        assert_eq!(ObjectName::new("x").parent(), None);
    }

    #[test]
    fn test_qualified_constructor() {
        let parent = ObjectName::new("sys");
        assert_eq!(ObjectName::qualified(&parent, "count"), ObjectName::parse("sys.count"));
    }

    #[test]
    fn test_matches_under_case_policy() {
        let a = ObjectName::parse("App.Total");
        let b = ObjectName::parse("app.total");
        assert!(a.matches(&b, true));
        assert!(!a.matches(&b, false));
        assert!(!a.matches(&ObjectName::new("total"), true));
    }

    #[test]
    fn test_glob() {
        assert!(ObjectName::glob().is_glob());
        assert!(!ObjectName::parse("t.*").is_glob());
    }
}
