use crate::build::{CollectionPlan, Sequence};
use crate::config::ResolverConfig;
use crate::dependencies::types::{Registration, RegistrationEntry, Registry};
use crate::errors::ResolveError;
use crate::lifetime::{ContainerLifetime, LifetimeContainer, LifetimeManager, LifetimeScope};
use crate::policy::{Policy, PolicyKind, PolicyStore};
use crate::resolution::{ResolutionContext, ResolverOverride};
use crate::types::{downcast_instance, BuildKey, Instance, TypeKey};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Explicit registrations: insertion order plus a key index.
#[derive(Default)]
struct RegistrationTable {
    order: Vec<Arc<Registration>>,
    index: HashMap<BuildKey, usize>,
}

impl RegistrationTable {
    fn insert(&mut self, registration: Registration) {
        let key = registration.key().clone();
        let registration = Arc::new(registration);
        match self.index.get(&key) {
            Some(&slot) => self.order[slot] = registration,
            None => {
                self.index.insert(key, self.order.len());
                self.order.push(registration);
            }
        }
    }

    fn get(&self, key: &BuildKey) -> Option<Arc<Registration>> {
        self.index.get(key).map(|&slot| Arc::clone(&self.order[slot]))
    }
}

/// **DEPENDENCY CONTAINER**
///
/// **PURPOSE**: Registry of build recipes and entry point for resolve calls
/// **GUARANTEE**: Independent resolve calls may run concurrently; each gets
/// its own call tree state
///
/// Lookup order for `(ty, name)`:
/// 1. the explicit registration of that key
/// 2. for a closed generic, the open registration of its definition
/// 3. for `Sequence<T>`, a synthesized collection registration
///
/// Derived registrations are rebuilt after every `register`; singleton caches
/// of closed generics live apart from them and last until their open
/// registration is replaced.
pub struct Container {
    registrations: RwLock<RegistrationTable>,
    derived: RwLock<HashMap<BuildKey, Arc<Registration>>>,
    closed_singletons: RwLock<HashMap<BuildKey, Arc<dyn LifetimeManager>>>,
    policies: RwLock<PolicyStore>,
    lifetime: LifetimeContainer,
    config: ResolverConfig,
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(ResolverConfig::default())
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        Self {
            registrations: RwLock::new(RegistrationTable::default()),
            derived: RwLock::new(HashMap::new()),
            closed_singletons: RwLock::new(HashMap::new()),
            policies: RwLock::new(PolicyStore::new()),
            lifetime: LifetimeContainer::new(),
            config,
        }
    }

    /// Adds a registration; an existing one with the same key is replaced in place.
    pub fn register(&self, registration: Registration) -> &Self {
        log::debug!("Registering {}", registration.key());
        let key = registration.key().clone();
        self.registrations.write().insert(registration);
        self.derived.write().clear();
        if key.ty.is_open_definition() {
            self.closed_singletons.write().retain(|closed, _| {
                closed.name != key.name || closed.ty.generic_definition().as_ref() != Some(&key.ty)
            });
        }
        self
    }

    pub fn is_registered(&self, ty: &TypeKey, name: Option<&str>) -> bool {
        self.registrations
            .read()
            .index
            .contains_key(&BuildKey::new(ty.clone(), name.map(str::to_string)))
    }

    /// Container-wide policy, seen by every later resolve call.
    pub fn set_policy(&self, ty: &TypeKey, name: Option<&str>, policy: Policy) {
        self.policies.write().set(ty, name, policy);
    }

    pub fn clear_policy(&self, ty: &TypeKey, name: Option<&str>, kind: PolicyKind) {
        self.policies.write().clear(ty, name, kind);
    }

    pub fn lifetime_container(&self) -> &LifetimeContainer {
        &self.lifetime
    }

    pub fn resolve(&self, ty: &TypeKey, name: Option<&str>) -> Result<Instance, ResolveError> {
        self.run(ty, name, None, Vec::new())
    }

    pub fn resolve_with(
        &self,
        ty: &TypeKey,
        name: Option<&str>,
        overrides: Vec<ResolverOverride>,
    ) -> Result<Instance, ResolveError> {
        self.run(ty, name, None, overrides)
    }

    /// Resolves `T` and downcasts the result.
    pub fn resolve_as<T: Any + Send + Sync>(&self, name: Option<&str>) -> Result<Arc<T>, ResolveError> {
        let ty = TypeKey::of::<T>();
        let instance = self.resolve(&ty, name)?;
        downcast_instance(instance, &BuildKey::new(ty, name.map(str::to_string)))
    }

    /// Resolves the trait object `D`, registered as producing `Arc<D>`.
    pub fn resolve_service<D: ?Sized + Send + Sync + 'static>(
        &self,
        name: Option<&str>,
    ) -> Result<Arc<D>, ResolveError> {
        let ty = TypeKey::of::<D>();
        let instance = self.resolve(&ty, name)?;
        let service = downcast_instance::<Arc<D>>(instance, &BuildKey::new(ty, name.map(str::to_string)))?;
        Ok(service.as_ref().clone())
    }

    /// Resolves `Sequence<element>` in a call tree of its own.
    pub fn resolve_sequence(&self, element: TypeKey) -> Result<Arc<Sequence>, ResolveError> {
        let ty = TypeKey::sequence_of(element);
        let instance = self.resolve(&ty, None)?;
        downcast_instance(instance, &BuildKey::new(ty, None))
    }

    /// Runs the chain of `(ty, name)` over an object that already exists.
    pub fn build_up(
        &self,
        ty: &TypeKey,
        name: Option<&str>,
        existing: Instance,
        overrides: Vec<ResolverOverride>,
    ) -> Result<Instance, ResolveError> {
        self.run(ty, name, Some(existing), overrides)
    }

    fn run(
        &self,
        ty: &TypeKey,
        name: Option<&str>,
        existing: Option<Instance>,
        overrides: Vec<ResolverOverride>,
    ) -> Result<Instance, ResolveError> {
        let registration = self.registration(ty, name).map_err(|e| {
            e.with_path(|| vec![BuildKey::new(ty.clone(), name.map(str::to_string))])
        })?;
        log::debug!(
            "Resolving {} with {} override(s)",
            registration.key(),
            overrides.len()
        );

        let mut ctx = ResolutionContext::new(self, Arc::clone(&registration), existing, overrides);
        registration.chain().execute(&mut ctx)
    }

    fn derive(&self, key: &BuildKey) -> Option<Arc<Registration>> {
        if let Some(registration) = self.derived.read().get(key) {
            return Some(Arc::clone(registration));
        }

        let registration = if let Some(definition) = key.ty.generic_definition() {
            let open_key = BuildKey::new(definition, key.name.clone());
            match self.registrations.read().get(&open_key) {
                Some(open) => Some(open.close(key.clone(), |closed| self.closed_singleton(closed))),
                None if key.ty.sequence_element().is_some() => {
                    Some(CollectionPlan::registration(key.clone()))
                }
                None => None,
            }
        } else {
            None
        }?;

        log::debug!("Derived registration for {}", key);
        // a racing caller may have derived the same key; keep the first one
        let mut derived = self.derived.write();
        Some(Arc::clone(
            derived
                .entry(key.clone())
                .or_insert_with(|| Arc::new(registration)),
        ))
    }
}

impl Container {
    fn closed_singleton(&self, key: &BuildKey) -> Arc<dyn LifetimeManager> {
        let mut singletons = self.closed_singletons.write();
        Arc::clone(
            singletons
                .entry(key.clone())
                .or_insert_with(|| Arc::new(ContainerLifetime::new())),
        )
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry for Container {
    fn registration(&self, ty: &TypeKey, name: Option<&str>) -> Result<Arc<Registration>, ResolveError> {
        let key = BuildKey::new(ty.clone(), name.map(str::to_string));
        if let Some(registration) = self.registrations.read().get(&key) {
            return Ok(registration);
        }
        self.derive(&key)
            .ok_or_else(|| ResolveError::resolution_failed(key, "No registration for this type and name"))
    }

    fn registrations(&self) -> Vec<RegistrationEntry> {
        self.registrations
            .read()
            .order
            .iter()
            .map(|registration| registration.entry())
            .collect()
    }

    fn container_policy(&self, ty: &TypeKey, name: Option<&str>, kind: PolicyKind) -> Option<Policy> {
        self.policies.read().get(ty, name, kind).cloned()
    }

    fn lifetime(&self) -> &dyn LifetimeScope {
        &self.lifetime
    }

    fn config(&self) -> &ResolverConfig {
        &self.config
    }
}
