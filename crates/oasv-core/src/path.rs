//! # Instance Paths
//!
//! Locates a value inside a JSON payload. Rendering follows the dotted
//! accessor style used in API error reports:
//!
//! - object keys are joined with `.` (`carp.weight`);
//! - array indices are rendered in brackets with no separator (`carps[2]`);
//! - the root is the empty path.
//!
//! Paths are small and cloned per recursion step; the validator never
//! mutates a path shared with a sibling branch.

use std::fmt;

use serde::{Serialize, Serializer};

/// One step into a JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object property name.
    Key(String),
    /// Zero-based array index.
    Index(usize),
}

/// Location of a value inside a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    /// The root of the document.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of property `key` below this path.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Path of array element `index` below this path.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// True for the document root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments from the root downwards.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Nesting depth (number of segments).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(k) if i == 0 => write!(f, "{k}")?,
                PathSegment::Key(k) => write!(f, ".{k}")?,
                PathSegment::Index(n) => write!(f, "[{n}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for InstancePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
