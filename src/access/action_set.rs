use std::collections::BTreeSet;
use std::fmt;

/// Action that grants every other action on a resource.
pub const WILDCARD_ACTION: &str = "*";

/// Set of actions (`pull`, `push`, ...) with wildcard semantics.
///
/// Actions are kept sorted so that rendered scopes are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSet {
    actions: BTreeSet<String>,
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, action: impl Into<String>) {
        self.actions.insert(action.into());
    }

    /// Adds every action of `other` to this set.
    pub fn union(&mut self, other: &ActionSet) {
        self.actions.extend(other.actions.iter().cloned());
    }

    /// Returns true when `action` is granted, either literally or through `*`.
    pub fn contains(&self, action: &str) -> bool {
        self.actions.contains(WILDCARD_ACTION) || self.actions.contains(action)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ActionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for ActionSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.actions.extend(iter.into_iter().map(Into::into));
    }
}

impl fmt::Display for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for action in &self.actions {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(action)?;
            first = false;
        }
        Ok(())
    }
}
