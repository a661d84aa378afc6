use serde::{Deserialize, Serialize};

/// A registry entity that actions are authorized against, e.g. a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub name: String,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            class: None,
            name: name.into(),
        }
    }

    pub fn repository(name: impl Into<String>) -> Self {
        Self::new("repository", name)
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Grants and requests are matched on type and name only.
    pub(crate) fn matches(&self, resource_type: &str, name: &str) -> bool {
        self.resource_type == resource_type && self.name == name
    }
}

/// One requested action on one resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Access {
    pub resource: Resource,
    pub action: String,
}

impl Access {
    pub fn new(resource: Resource, action: impl Into<String>) -> Self {
        Self {
            resource,
            action: action.into(),
        }
    }

    pub fn repository(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(Resource::repository(name), action)
    }
}
