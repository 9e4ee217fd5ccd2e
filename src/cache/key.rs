// Cache key construction.
// Maps a logical request (resource kind, identifier, filters) to a stable
// string so identical requests share an entry and different ones never do.

use std::fmt;

const DELIMITER: char = ':';

/// Builder for cache keys of the form `kind:identifier[:param...]`.
///
/// Every filter parameter that changes the result set must be pushed onto
/// the key; leaving one out makes logically different requests collide
/// (e.g. open and closed issues sharing one entry).
#[derive(Debug, Clone)]
pub struct CacheKey {
    segments: Vec<String>,
}

impl CacheKey {
    /// Start a key with its resource-kind tag (e.g. `"repo"`, `"issues"`).
    pub fn new(kind: &str) -> Self {
        Self {
            segments: vec![kind.to_string()],
        }
    }

    /// Append a segment: the resource identifier or a filter parameter.
    pub fn push(mut self, segment: impl AsRef<str>) -> Self {
        self.segments.push(segment.as_ref().to_string());
        self
    }

    pub fn build(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, "{}", DELIMITER)?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}
