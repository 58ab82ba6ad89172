use crate::build::BuildPlan;
use crate::errors::ResolveError;
use crate::lifetime::LifetimeManager;
use crate::types::{downcast_instance, BuildKey, Instance};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Converts a mapped instance into the instance the requested type expects.
pub type ProjectFn = Arc<dyn Fn(Instance, &BuildKey) -> Result<Instance, ResolveError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Lifetime,
    Mapping,
    Plan,
    Settings,
}

/// Typed slot contents; each variant belongs to exactly one `PolicyKind`.
#[derive(Clone)]
pub enum Policy {
    Lifetime(Arc<dyn LifetimeManager>),
    Mapping(Mapping),
    Plan(Arc<dyn BuildPlan>),
    /// Free-form configuration for custom build steps.
    Settings(serde_json::Value),
}

impl Policy {
    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Lifetime(_) => PolicyKind::Lifetime,
            Policy::Mapping(_) => PolicyKind::Mapping,
            Policy::Plan(_) => PolicyKind::Plan,
            Policy::Settings(_) => PolicyKind::Settings,
        }
    }

    pub fn as_settings(&self) -> Option<&serde_json::Value> {
        match self {
            Policy::Settings(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Lifetime(_) => f.write_str("Policy::Lifetime(..)"),
            Policy::Mapping(mapping) => write!(f, "Policy::Mapping({})", mapping.target),
            Policy::Plan(_) => f.write_str("Policy::Plan(..)"),
            Policy::Settings(value) => write!(f, "Policy::Settings({})", value),
        }
    }
}

/// Type mapping from a requested key to the key that actually gets built.
#[derive(Clone)]
pub struct Mapping {
    pub target: BuildKey,
    pub project: Option<ProjectFn>,
}

impl Mapping {
    pub fn new(target: BuildKey) -> Self {
        Self {
            target,
            project: None,
        }
    }

    pub fn with_projection(target: BuildKey, project: ProjectFn) -> Self {
        Self {
            target,
            project: Some(project),
        }
    }
}

/// Builds a projection from `Arc<S>` to `Arc<D>`, typically an unsizing
/// coercion such as `|foo: Arc<Foo>| foo as Arc<dyn Service>`. The result is
/// stored as `Arc<Arc<D>>`.
pub fn project<S, D>(convert: impl Fn(Arc<S>) -> Arc<D> + Send + Sync + 'static) -> ProjectFn
where
    S: Any + Send + Sync,
    D: ?Sized + Send + Sync + 'static,
{
    Arc::new(move |instance: Instance, key: &BuildKey| {
        let source = downcast_instance::<S>(instance, key)?;
        Ok(Arc::new(convert(source)) as Instance)
    })
}

/// **REGISTRATION POLICY SET** - One slot per policy kind
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    slots: HashMap<PolicyKind, Policy>,
}

impl PolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: PolicyKind) -> Option<&Policy> {
        self.slots.get(&kind)
    }

    pub fn set(&mut self, policy: Policy) {
        self.slots.insert(policy.kind(), policy);
    }

    pub fn clear(&mut self, kind: PolicyKind) {
        self.slots.remove(&kind);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
