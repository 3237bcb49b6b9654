// Dotted rule set keys

use crate::{RequirementsError, Result};
use std::fmt;

/// A dotted rule set key such as `route.simple_get`.
///
/// Every segment but the last names the collection the rule set lives in
/// (`route`, or `admin/users` for `admin.users.list`); the last segment
/// names the rule set inside that collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleSetKey {
    segments: Vec<String>,
}

impl RuleSetKey {
    pub fn parse(key: &str) -> Result<Self> {
        let segments: Vec<String> = key.split('.').map(str::to_string).collect();

        let malformed = segments.len() < 2
            || segments
                .iter()
                .any(|segment| segment.trim().is_empty() || segment.contains(['/', '\\']));
        if malformed {
            return Err(RequirementsError::InvalidKey(key.to_string()));
        }

        Ok(Self { segments })
    }

    /// Collection segments (all but the last)
    pub fn collection(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// Collection sub-path, segments joined with `/`
    pub fn location(&self) -> String {
        self.collection().join("/")
    }

    /// Name of the rule set inside its collection
    pub fn name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Key of another rule set in the same collection
    pub fn sibling(&self, name: &str) -> Result<Self> {
        if name.trim().is_empty() || name.contains(['.', '/', '\\']) {
            return Err(RequirementsError::InvalidKey(name.to_string()));
        }
        let mut segments = self.collection().to_vec();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// Resolve an `_inheritFrom` reference relative to this key: a bare name
    /// is a sibling, a dotted value is a full key.
    pub fn reference(&self, reference: &str) -> Result<Self> {
        if reference.contains('.') {
            Self::parse(reference)
        } else {
            self.sibling(reference)
        }
    }
}

impl fmt::Display for RuleSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
