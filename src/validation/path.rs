//! Entity paths used to locate structural violations inside a contract document.

use std::fmt;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named field, e.g. `properties`
    Key(String),
    /// A list position, e.g. `[5]`
    Index(usize),
}

/// Location of a field inside a contract document.
///
/// Renders the way the document is navigated, e.g.
/// `schema[2].properties[5].primaryKeyPosition`. The empty path renders as
/// `contract`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of a named field below this one
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Path of a list element below this one
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "contract");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(key: &str) -> Self {
        FieldPath::root().key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_path_display() {
        let path = FieldPath::root()
            .key("schema")
            .index(2)
            .key("properties")
            .index(5)
            .key("primaryKeyPosition");
        assert_eq!(path.to_string(), "schema[2].properties[5].primaryKeyPosition");
    }

    #[test]
    fn test_root_display() {
        assert_eq!(FieldPath::root().to_string(), "contract");
        assert!(FieldPath::root().is_root());
        assert_eq!(FieldPath::from("apiVersion").to_string(), "apiVersion");
    }
}
