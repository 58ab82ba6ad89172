use crate::dependencies::{Registration, Registry};
use crate::errors::{error_codes, ResolveError};
use crate::lifetime::LifetimeScope;
use crate::policy::{Policy, PolicyKind, PolicyStore};
use crate::resolution::overrides::{InjectionValue, OverrideMatcher, ResolverFactory, ResolverOverride};
use crate::types::{BuildKey, Instance, ParameterDescriptor, PropertyDescriptor, TypeKey};
use std::sync::Arc;

/// One level of the call tree: the identity being built and its result slot.
struct Frame {
    registration: Arc<Registration>,
    existing: Option<Instance>,
    build_complete: bool,
}

impl Frame {
    fn new(registration: Arc<Registration>, existing: Option<Instance>) -> Self {
        Self {
            registration,
            existing,
            build_complete: false,
        }
    }
}

/// **RESOLUTION CONTEXT**
///
/// **PURPOSE**: Mutable state of one resolve call tree
/// **GUARANTEE**: Frames are pushed and popped in strict depth-first order;
/// the frame on top of the stack is the identity build steps operate on
///
/// The override list and the local policy store belong to the call tree, so
/// every frame sees the same overrides and the same scope-local policies.
pub struct ResolutionContext<'r> {
    registry: &'r dyn Registry,
    lifetime: &'r dyn LifetimeScope,
    overrides: Arc<[ResolverOverride]>,
    policies: PolicyStore,
    current: Frame,
    parents: Vec<Frame>,
    max_depth: usize,
}

impl<'r> ResolutionContext<'r> {
    /// **ROOT CONTEXT** - Bound to the registration of a top-level resolve call
    pub fn new(
        registry: &'r dyn Registry,
        registration: Arc<Registration>,
        existing: Option<Instance>,
        overrides: Vec<ResolverOverride>,
    ) -> Self {
        Self {
            registry,
            lifetime: registry.lifetime(),
            overrides: overrides.into(),
            policies: PolicyStore::new(),
            current: Frame::new(registration, existing),
            parents: Vec::new(),
            max_depth: registry.config().max_depth,
        }
    }

    pub fn build_key(&self) -> &BuildKey {
        self.current.registration.key()
    }

    pub fn ty(&self) -> &TypeKey {
        &self.build_key().ty
    }

    pub fn name(&self) -> Option<&str> {
        self.build_key().name.as_deref()
    }

    pub fn registration(&self) -> &Arc<Registration> {
        &self.current.registration
    }

    pub fn registry(&self) -> &'r dyn Registry {
        self.registry
    }

    pub fn lifetime(&self) -> &'r dyn LifetimeScope {
        self.lifetime
    }

    pub fn overrides(&self) -> &[ResolverOverride] {
        &self.overrides
    }

    pub fn existing(&self) -> Option<&Instance> {
        self.current.existing.as_ref()
    }

    pub fn is_build_complete(&self) -> bool {
        self.current.build_complete
    }

    /// Stores a result without ending the chain. Refused once the build is
    /// complete.
    pub fn set_existing(&mut self, value: Instance) -> bool {
        if self.current.build_complete {
            log::warn!(
                "Ignoring result for {}: build already complete",
                self.build_key()
            );
            return false;
        }
        self.current.existing = Some(value);
        true
    }

    /// Stores a result and ends the pre-build phase of the chain.
    pub fn complete(&mut self, value: Instance) -> bool {
        let stored = self.set_existing(value);
        self.current.build_complete = true;
        stored
    }

    pub fn set_build_complete(&mut self) {
        self.current.build_complete = true;
    }

    /// Swaps the result for the instance a lifetime manager kept instead.
    pub(crate) fn replace_existing(&mut self, value: Instance) {
        self.current.existing = Some(value);
    }

    /// Frames on the stack, the current one included.
    pub fn depth(&self) -> usize {
        self.parents.len() + 1
    }

    pub fn parent_key(&self) -> Option<&BuildKey> {
        self.parents.last().map(|frame| frame.registration.key())
    }

    /// Build keys from the root frame down to the current one.
    pub fn path(&self) -> Vec<BuildKey> {
        self.parents
            .iter()
            .chain(std::iter::once(&self.current))
            .map(|frame| frame.registration.key().clone())
            .collect()
    }

    fn enter(&mut self, frame: Frame) -> Result<(), ResolveError> {
        if self.depth() >= self.max_depth {
            let mut path = self.path();
            let key = frame.registration.key().clone();
            path.push(key.clone());
            return Err(ResolveError::CircularDependency {
                key,
                depth: self.max_depth,
                path,
            });
        }
        let parent = std::mem::replace(&mut self.current, frame);
        self.parents.push(parent);
        Ok(())
    }

    fn leave(&mut self) {
        if let Some(parent) = self.parents.pop() {
            self.current = parent;
        }
    }

    /// **RESOLVE DEPENDENCY**
    ///
    /// Runs the build chain of `(ty, name)` on a child frame and returns its
    /// result. Failures propagate unchanged; the child frame is popped on
    /// every path.
    pub fn resolve(&mut self, ty: &TypeKey, name: Option<&str>) -> Result<Instance, ResolveError> {
        let registration = self
            .registry
            .registration(ty, name)
            .map_err(|e| {
                e.with_path(|| {
                    let mut path = self.path();
                    path.push(BuildKey::new(ty.clone(), name.map(str::to_string)));
                    path
                })
            })?;

        self.enter(Frame::new(Arc::clone(&registration), None))?;
        log::trace!(
            "Resolving {} at depth {}",
            registration.key(),
            self.depth()
        );
        let result = registration.chain().execute(self);
        self.leave();
        result
    }

    /// **SIBLING CONTEXT**
    ///
    /// Re-enters the current identity with a replacement result slot. The
    /// sibling shares the overrides and local policies of the call tree.
    pub fn with_existing<T>(
        &mut self,
        existing: Option<Instance>,
        build: impl FnOnce(&mut Self) -> Result<T, ResolveError>,
    ) -> Result<T, ResolveError> {
        let registration = Arc::clone(&self.current.registration);
        self.enter(Frame::new(registration, existing))?;
        let result = build(self);
        self.leave();
        result
    }

    /// **RESOLVE CONSTRUCTOR PARAMETER**
    pub fn resolve_parameter(
        &mut self,
        parameter: &ParameterDescriptor,
        name: Option<&str>,
        value: &InjectionValue,
    ) -> Result<Instance, ResolveError> {
        let overrides = Arc::clone(&self.overrides);
        let candidates = OverrideMatcher::new(&overrides).for_parameter(parameter);
        if let Some(result) = self.apply_overrides(candidates, &parameter.ty) {
            return result;
        }

        match value {
            InjectionValue::Resolver(resolver) => resolver(self),
            InjectionValue::Policy(policy) => policy.resolve(self),
            InjectionValue::Factory(factory) => self.resolve_from_factory(factory.as_ref()),
            InjectionValue::Type(token) if parameter.ty == TypeKey::meta() => {
                Ok(Arc::new(token.clone()))
            }
            InjectionValue::Value(instance) => Ok(instance.clone()),
            InjectionValue::Inject | InjectionValue::Type(_) => self.resolve(&parameter.ty, name),
        }
    }

    /// **RESOLVE SETTABLE PROPERTY**
    pub fn resolve_property(
        &mut self,
        property: &PropertyDescriptor,
        name: Option<&str>,
        value: &InjectionValue,
    ) -> Result<Instance, ResolveError> {
        let overrides = Arc::clone(&self.overrides);
        let candidates = OverrideMatcher::new(&overrides).for_property(property);
        if let Some(result) = self.apply_overrides(candidates, &property.ty) {
            return result;
        }

        match value {
            InjectionValue::Inject => self.resolve(&property.ty, name),
            InjectionValue::Resolver(resolver) => resolver(self),
            InjectionValue::Policy(policy) => policy.resolve(self),
            InjectionValue::Factory(factory) => self.resolve_from_factory(factory.as_ref()),
            InjectionValue::Type(token) => Ok(Arc::new(token.clone())),
            InjectionValue::Value(instance) => Ok(instance.clone()),
        }
    }

    fn apply_overrides<'o>(
        &mut self,
        candidates: impl Iterator<Item = &'o ResolverOverride>,
        declared: &TypeKey,
    ) -> Option<Result<Instance, ResolveError>> {
        for candidate in candidates {
            let value = candidate.value();
            if let Some(instance) = value.literal() {
                log::trace!("Override value used for {} in {}", declared, self.build_key());
                return Some(Ok(instance));
            }
            // an override without a resolver for this type defers to earlier ones
            if let Some(resolver) = value.resolver_for(declared) {
                log::trace!("Override resolver used for {} in {}", declared, self.build_key());
                return Some(resolver(self));
            }
        }
        None
    }

    // Factories are specialized to the type being built, so they can read
    // the arguments of a closed generic.
    fn resolve_from_factory(
        &mut self,
        factory: &dyn ResolverFactory,
    ) -> Result<Instance, ResolveError> {
        let ty = self.ty().clone();
        match factory.resolver_for(&ty) {
            Some(resolver) => resolver(self),
            None => Err(ResolveError::invalid_configuration(
                error_codes::RESOLVER_UNAVAILABLE,
                format!("Resolver factory produced no resolver for {}", ty),
            )),
        }
    }

    /// **POLICY LOOKUP**
    ///
    /// Local store first, then container-wide policies, then the intrinsic
    /// policies of the registration when `(ty, name)` is this frame's own
    /// identity.
    pub fn get_policy(&self, ty: &TypeKey, name: Option<&str>, kind: PolicyKind) -> Option<Policy> {
        if let Some(policy) = self.policies.get(ty, name, kind) {
            return Some(policy.clone());
        }
        if let Some(policy) = self.registry.container_policy(ty, name, kind) {
            return Some(policy);
        }
        if self.build_key().matches(ty, name) {
            return self.current.registration.policies().get(kind).cloned();
        }
        None
    }

    /// Sets a policy for the rest of this call tree only.
    pub fn set_policy(&mut self, ty: &TypeKey, name: Option<&str>, policy: Policy) {
        self.policies.set(ty, name, policy);
    }

    pub fn clear_policy(&mut self, ty: &TypeKey, name: Option<&str>, kind: PolicyKind) {
        self.policies.clear(ty, name, kind);
    }

    /// Convenience lookup of this frame's own policy.
    pub fn own_policy(&self, kind: PolicyKind) -> Option<Policy> {
        let key = self.build_key();
        self.get_policy(&key.ty, key.name.as_deref(), kind)
    }
}
