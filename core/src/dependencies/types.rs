use crate::build::{BuildChain, BuildPlan, BuildStep, ConstructorPlan, FactoryPlan};
use crate::config::ResolverConfig;
use crate::errors::ResolveError;
use crate::lifetime::{ContainerLifetime, LifetimeManager, LifetimeScope};
use crate::policy::{Mapping, Policy, PolicyKind, PolicySet, ProjectFn};
use crate::resolution::ResolutionContext;
use crate::types::{BuildKey, Instance, TypeKey};
use std::fmt;
use std::sync::Arc;

/// **REGISTRY COLLABORATOR**
///
/// **PURPOSE**: What the resolution engine reads from the container
/// **MANDATE**: Implementations MUST allow concurrent reads from independent
/// resolve calls
pub trait Registry: Send + Sync {
    /// **RETURNS**: `ResolutionFailed` when nothing can build `(ty, name)`
    fn registration(&self, ty: &TypeKey, name: Option<&str>) -> Result<Arc<Registration>, ResolveError>;

    /// Explicit registrations in insertion order.
    fn registrations(&self) -> Vec<RegistrationEntry>;

    fn container_policy(&self, ty: &TypeKey, name: Option<&str>, kind: PolicyKind) -> Option<Policy>;

    fn lifetime(&self) -> &dyn LifetimeScope;

    fn config(&self) -> &ResolverConfig;
}

/// Enumeration view of one registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationEntry {
    pub registered_type: TypeKey,
    pub name: Option<String>,
}

/// **REGISTRATION**
///
/// **PURPOSE**: Recipe for one `(type, name)` identity: its build chain and
/// intrinsic policies
/// **GUARANTEE**: Immutable once handed to the container
pub struct Registration {
    key: BuildKey,
    chain: BuildChain,
    policies: PolicySet,
    singleton: bool,
}

impl Registration {
    pub fn builder(ty: TypeKey) -> RegistrationBuilder {
        RegistrationBuilder {
            key: BuildKey::new(ty, None),
            chain: BuildChain::standard(),
            policies: PolicySet::new(),
            singleton: false,
        }
    }

    pub fn key(&self) -> &BuildKey {
        &self.key
    }

    pub fn chain(&self) -> &BuildChain {
        &self.chain
    }

    pub fn policies(&self) -> &PolicySet {
        &self.policies
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    pub fn entry(&self) -> RegistrationEntry {
        RegistrationEntry {
            registered_type: self.key.ty.clone(),
            name: self.key.name.clone(),
        }
    }

    /// Copy of an open-generic registration bound to a closed key. Singletons
    /// take the cache `singleton_cache` hands out for that key, so each closed
    /// type owns its own instance.
    pub(crate) fn close<F>(&self, key: BuildKey, singleton_cache: F) -> Registration
    where
        F: FnOnce(&BuildKey) -> Arc<dyn LifetimeManager>,
    {
        let mut policies = self.policies.clone();
        if self.singleton {
            policies.set(Policy::Lifetime(singleton_cache(&key)));
        }
        Registration {
            key,
            chain: self.chain.clone(),
            policies,
            singleton: self.singleton,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("chain", &self.chain)
            .field("policies", &self.policies)
            .field("singleton", &self.singleton)
            .finish()
    }
}

/// **REGISTRATION BUILDER**
///
/// Starts from the standard chain with no policies, i.e. a transient
/// registration that fails to build until a mapping or plan is supplied.
pub struct RegistrationBuilder {
    key: BuildKey,
    chain: BuildChain,
    policies: PolicySet,
    singleton: bool,
}

impl RegistrationBuilder {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.key.name = Some(name.into());
        self
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.key.name = name;
        self
    }

    /// One instance per container, tracked by the container's lifetime scope.
    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self.policy(Policy::Lifetime(Arc::new(ContainerLifetime::new())))
    }

    pub fn lifetime(mut self, manager: Arc<dyn LifetimeManager>) -> Self {
        self.singleton = false;
        self.policy(Policy::Lifetime(manager))
    }

    pub fn maps_to(self, target: BuildKey) -> Self {
        self.policy(Policy::Mapping(Mapping::new(target)))
    }

    /// Mapping whose result is converted by `project`, typically into a trait object.
    pub fn maps_to_with(self, target: BuildKey, project: ProjectFn) -> Self {
        self.policy(Policy::Mapping(Mapping::with_projection(target, project)))
    }

    pub fn factory<F>(self, factory: F) -> Self
    where
        F: for<'a, 'r> Fn(&'a mut ResolutionContext<'r>) -> Result<Instance, ResolveError>
            + Send
            + Sync
            + 'static,
    {
        self.plan(FactoryPlan::new(factory))
    }

    pub fn constructor(self, plan: ConstructorPlan) -> Self {
        self.plan(plan)
    }

    pub fn plan(self, plan: impl BuildPlan + 'static) -> Self {
        self.policy(Policy::Plan(Arc::new(plan)))
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.policies.set(policy);
        self
    }

    /// Appends a step after the existing ones.
    pub fn step(mut self, step: Arc<dyn BuildStep>) -> Self {
        self.chain.push(step);
        self
    }

    pub fn chain(mut self, chain: BuildChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn build(self) -> Registration {
        Registration {
            key: self.key,
            chain: self.chain,
            policies: self.policies,
            singleton: self.singleton,
        }
    }
}
