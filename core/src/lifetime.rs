//! Lifetime scope and lifetime managers.
//!
//! The resolution engine never inspects a scope; it forwards the reference
//! down the frame stack so lifetime managers can track what they create.

use crate::types::Instance;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fmt;

/// Ownership boundary for instances created while a container is alive.
pub trait LifetimeScope: Send + Sync {
    fn track(&self, instance: Instance);
}

/// **LIFETIME CONTAINER**
///
/// **PURPOSE**: Default scope owned by a `Container`
/// **GUARANTEE**: Safe for concurrent tracking from independent call trees
#[derive(Default)]
pub struct LifetimeContainer {
    instances: Mutex<Vec<Instance>>,
}

impl LifetimeContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases tracked instances, most recently created first.
    pub fn dispose(&self) {
        let mut instances = std::mem::take(&mut *self.instances.lock());
        log::debug!("Disposing {} tracked instance(s)", instances.len());
        while instances.pop().is_some() {}
    }
}

impl LifetimeScope for LifetimeContainer {
    fn track(&self, instance: Instance) {
        self.instances.lock().push(instance);
    }
}

impl fmt::Debug for LifetimeContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifetimeContainer")
            .field("tracked", &self.len())
            .finish()
    }
}

/// Storage strategy for the instances of one registration.
pub trait LifetimeManager: Send + Sync {
    fn get_value(&self) -> Option<Instance>;

    /// Stores `value` and returns the instance callers must use, which is
    /// the earlier one when another call tree stored first.
    fn set_value(&self, value: Instance, scope: &dyn LifetimeScope) -> Instance;
}

/// New instance on every resolve.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransientLifetime;

impl LifetimeManager for TransientLifetime {
    fn get_value(&self) -> Option<Instance> {
        None
    }

    fn set_value(&self, value: Instance, _scope: &dyn LifetimeScope) -> Instance {
        value
    }
}

/// **CONTAINER LIFETIME** - One instance for the lifetime of the container
#[derive(Default)]
pub struct ContainerLifetime {
    value: OnceCell<Instance>,
}

impl ContainerLifetime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: Instance) -> Self {
        Self {
            value: OnceCell::with_value(value),
        }
    }
}

impl LifetimeManager for ContainerLifetime {
    fn get_value(&self) -> Option<Instance> {
        self.value.get().cloned()
    }

    fn set_value(&self, value: Instance, scope: &dyn LifetimeScope) -> Instance {
        // first writer wins when two call trees race on the same singleton
        let mut stored_here = false;
        let stored = self
            .value
            .get_or_init(|| {
                stored_here = true;
                value
            })
            .clone();
        if stored_here {
            scope.track(stored.clone());
        }
        stored
    }
}

/// **PER-BUILD SINGLETON**
///
/// Holds one value for the remainder of a single resolve call tree. Installed
/// in the call tree's local policy store, never in container-wide policies.
pub struct PerBuildLifetime {
    value: Instance,
}

impl PerBuildLifetime {
    pub fn new(value: Instance) -> Self {
        Self { value }
    }
}

impl LifetimeManager for PerBuildLifetime {
    fn get_value(&self) -> Option<Instance> {
        Some(self.value.clone())
    }

    fn set_value(&self, _value: Instance, _scope: &dyn LifetimeScope) -> Instance {
        self.value.clone()
    }
}
