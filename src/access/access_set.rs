use super::action_set::ActionSet;
use super::resource::{Access, Resource};

/// Actions grouped per resource, in first-seen order.
///
/// Entries are keyed by resource type and name; the class of the first entry
/// seen for a key is the one kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessSet {
    entries: Vec<(Resource, ActionSet)>,
}

impl AccessSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_requests(requests: &[Access]) -> Self {
        let mut set = Self::new();
        for request in requests {
            set.entry(&request.resource).insert(request.action.clone());
        }
        set
    }

    /// Unions `actions` into the entry for `resource`.
    pub fn add(&mut self, resource: &Resource, actions: &ActionSet) {
        self.entry(resource).union(actions);
    }

    pub fn actions_for(&self, resource: &Resource) -> Option<&ActionSet> {
        self.entries
            .iter()
            .find(|(key, _)| key.matches(&resource.resource_type, &resource.name))
            .map(|(_, actions)| actions)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Resource, &ActionSet)> {
        self.entries.iter().map(|(resource, actions)| (resource, actions))
    }

    /// Renders the set as a space separated list of `type:name:actions` scopes.
    pub fn scope_param(&self) -> String {
        self.entries
            .iter()
            .map(|(resource, actions)| {
                format!("{}:{}:{}", resource.resource_type, resource.name, actions)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn entry(&mut self, resource: &Resource) -> &mut ActionSet {
        let index = match self
            .entries
            .iter()
            .position(|(key, _)| key.matches(&resource.resource_type, &resource.name))
        {
            Some(index) => index,
            None => {
                self.entries.push((resource.clone(), ActionSet::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }
}
