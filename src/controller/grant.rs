use crate::access::Resource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub name: String,
}

/// Outcome of a successful access decision.
///
/// `resources` lists everything the token grants any access to, not only the
/// resources that were requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub user: UserInfo,
    pub resources: Vec<Resource>,
}
