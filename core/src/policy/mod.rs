pub mod store;
pub mod types;

pub use store::PolicyStore;
pub use types::{project, Mapping, Policy, PolicyKind, PolicySet, ProjectFn};
