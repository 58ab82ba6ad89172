pub mod chain;
pub mod collection;
pub mod plans;
pub mod steps;

pub use chain::{BuildChain, BuildStep};
pub use collection::{CollectionPlan, Sequence};
pub use plans::{Arguments, BuildPlan, ConstructorPlan, FactoryPlan, InjectionMember};
pub use steps::{LifetimeStep, MappingStep, PlanStep};
