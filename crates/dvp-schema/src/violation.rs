//! Schema violations and their deterministic ordering

use serde_json::Value;
use std::fmt;

/// One step of an instance path
///
/// Array indices sort before object keys, and numerically among themselves,
/// so `items/2` comes before `items/10`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(idx) => write!(f, "{}", idx),
            PathSegment::Key(key) => write!(f, "{}", key),
        }
    }
}

/// A single failed constraint, located by its instance path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Violation {
    pub fn new(path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    /// Violation on the document root
    pub fn at_root(message: impl Into<String>) -> Self {
        Self::new(Vec::new(), message)
    }

    /// Violation on a top-level key
    pub fn at_key(key: &str, message: impl Into<String>) -> Self {
        Self::new(vec![PathSegment::Key(key.to_string())], message)
    }

    /// Render the path as a JSON pointer (`/` for the root)
    pub fn pointer(&self) -> String {
        if self.path.is_empty() {
            return "/".to_string();
        }
        self.path
            .iter()
            .map(|segment| format!("/{}", escape_pointer_token(&segment.to_string())))
            .collect()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.message, self.pointer())
    }
}

/// Split a JSON pointer into path segments
pub fn parse_pointer(pointer: &str) -> Vec<PathSegment> {
    pointer
        .split('/')
        .skip(1)
        .map(|token| {
            let token = token.replace("~1", "/").replace("~0", "~");
            match token.parse::<usize>() {
                Ok(idx) if !token.starts_with('+') => PathSegment::Index(idx),
                _ => PathSegment::Key(token),
            }
        })
        .collect()
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Sort by instance path; the sort is stable so ties keep discovery order
pub fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| a.path.cmp(&b.path));
}

/// Run a compiled schema over an instance and collect every violation, sorted
pub fn collect_violations(validator: &jsonschema::Validator, instance: &Value) -> Vec<Violation> {
    let mut violations: Vec<Violation> = validator
        .iter_errors(instance)
        .map(|error| {
            Violation::new(
                parse_pointer(&error.instance_path.to_string()),
                error.to_string(),
            )
        })
        .collect();
    sort_violations(&mut violations);
    violations
}
