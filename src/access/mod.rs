mod access_set;
mod action_set;
mod resource;


pub use access_set::AccessSet;
pub use action_set::{ActionSet, WILDCARD_ACTION};
pub use resource::{Access, Resource};
