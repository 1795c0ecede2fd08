//! Dot/bracket state paths: `user.name`, `items[2].title`.

use std::fmt;

use super::store::StateError;
use crate::document::value::StateValue;

/// One step of a [`StatePath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A parsed state path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StatePath {
    segments: Vec<PathSegment>,
}

impl StatePath {
    /// Parse `a.b[2].c` into key and index segments.
    ///
    /// Empty keys, unterminated brackets and non-numeric indices are errors.
    pub fn parse(input: &str) -> Result<Self, StateError> {
        let invalid = || StateError::InvalidPath(input.to_owned());
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut segments = Vec::new();
        let mut key = String::new();
        let mut chars = trimmed.chars().peekable();
        // Set right after a `]` so that `a[0].b` does not see an empty key.
        let mut after_index = false;

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if key.is_empty() {
                        if !after_index {
                            return Err(invalid());
                        }
                    } else {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                    after_index = false;
                }
                '[' => {
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    } else if segments.is_empty() {
                        return Err(invalid());
                    }
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(d) => digits.push(d),
                            None => return Err(invalid()),
                        }
                    }
                    let index = digits.trim().parse::<usize>().map_err(|_| invalid())?;
                    segments.push(PathSegment::Index(index));
                    after_index = true;
                }
                ']' => return Err(invalid()),
                other => {
                    if after_index {
                        return Err(invalid());
                    }
                    key.push(other);
                }
            }
        }

        if !key.is_empty() {
            segments.push(PathSegment::Key(key));
        } else if !after_index {
            return Err(invalid());
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first key, if the path starts with one.
    pub fn root_key(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PathSegment::Key(key)) => Some(key),
            _ => None,
        }
    }

    /// Append a key segment (builder).
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    /// Append an index segment (builder).
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    /// Append all segments of `other`.
    pub fn join(mut self, other: &StatePath) -> Self {
        self.segments.extend(other.segments.iter().cloned());
        self
    }

    /// The path without its first `n` segments.
    pub fn skip(&self, n: usize) -> StatePath {
        StatePath {
            segments: self.segments.iter().skip(n).cloned().collect(),
        }
    }

    /// The first `len` segments.
    pub fn prefix(&self, len: usize) -> StatePath {
        StatePath {
            segments: self.segments.iter().take(len).cloned().collect(),
        }
    }

    /// Whether `self` equals `prefix` or extends it.
    pub fn starts_with(&self, prefix: &StatePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Whether one path is a prefix of the other (including equality).
    pub fn overlaps(&self, other: &StatePath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Walk `segments` down from `value`.
pub fn descend<'a>(value: &'a StateValue, segments: &[PathSegment]) -> Option<&'a StateValue> {
    let mut current = value;
    for segment in segments {
        current = match (segment, current) {
            (PathSegment::Key(key), StateValue::Object(map)) => map.get(key)?,
            (PathSegment::Index(index), StateValue::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(path: &str) -> Vec<PathSegment> {
        StatePath::parse(path).unwrap().segments().to_vec()
    }

    #[test]
    fn parses_keys_and_indices() {
        assert_eq!(
            keys("a.b[2].c"),
            vec![
                PathSegment::Key("a".into()),
                PathSegment::Key("b".into()),
                PathSegment::Index(2),
                PathSegment::Key("c".into()),
            ]
        );
    }

    #[test]
    fn parses_consecutive_indices() {
        assert_eq!(
            keys("grid[1][3]"),
            vec![
                PathSegment::Key("grid".into()),
                PathSegment::Index(1),
                PathSegment::Index(3),
            ]
        );
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "a..b", ".a", "a.", "[0]", "a[x]", "a[1", "a]", "a[0]b"] {
            assert!(StatePath::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn display_is_canonical() {
        let path = StatePath::parse(" items[ 3 ].title ").unwrap();
        assert_eq!(path.to_string(), "items[3].title");
    }

    #[test]
    fn prefix_relations() {
        let items = StatePath::parse("items").unwrap();
        let title = StatePath::parse("items[0].title").unwrap();
        let other = StatePath::parse("itemsCount").unwrap();
        assert!(title.starts_with(&items));
        assert!(!items.starts_with(&title));
        assert!(items.overlaps(&title));
        assert!(title.overlaps(&items));
        assert!(!items.overlaps(&other));
    }

    #[test]
    fn builders_and_skip() {
        let path = StatePath::parse("todos").unwrap().index(2).key("done");
        assert_eq!(path.to_string(), "todos[2].done");
        assert_eq!(path.skip(1).segments(), &[PathSegment::Index(2), PathSegment::Key("done".into())]);
        assert_eq!(path.root_key(), Some("todos"));
    }

    #[test]
    fn descend_walks_objects_and_arrays() {
        let value = StateValue::from(serde_json::json!({"a": [{"b": 1}]}));
        let path = StatePath::parse("a[0].b").unwrap();
        assert_eq!(descend(&value, path.segments()), Some(&StateValue::Int(1)));
        let missing = StatePath::parse("a[1].b").unwrap();
        assert_eq!(descend(&value, missing.segments()), None);
    }
}
