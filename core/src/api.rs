pub use crate::build::{
    Arguments, BuildChain, BuildPlan, BuildStep, CollectionPlan, ConstructorPlan, FactoryPlan,
    LifetimeStep, MappingStep, PlanStep, Sequence,
};
pub use crate::config::ResolverConfig;
pub use crate::dependencies::{Container, Registration, RegistrationBuilder, RegistrationEntry, Registry};
pub use crate::errors::{error_codes, ResolveError};
pub use crate::lifetime::{
    ContainerLifetime, LifetimeContainer, LifetimeManager, LifetimeScope, PerBuildLifetime,
    TransientLifetime,
};
pub use crate::policy::{project, Mapping, Policy, PolicyKind, PolicySet, PolicyStore, ProjectFn};
pub use crate::resolution::{
    resolve_fn, InjectionValue, OverrideMatcher, Resolve, ResolutionContext, ResolveFn,
    ResolverFactory, ResolverOverride,
};
pub use crate::types::{
    downcast_instance, BuildKey, GenericDefinition, Instance, ParameterDescriptor,
    PropertyDescriptor, TypeKey,
};
