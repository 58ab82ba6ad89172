//! # CALL-SCOPED OVERRIDES AND INJECTION VALUES
//!
//! **PURPOSE**: Describes where a parameter or property value comes from
//! **GUARANTEE**: Overrides are immutable once handed to a resolve call and
//! are shared by reference with every frame of that call tree

use crate::errors::ResolveError;
use crate::resolution::context::ResolutionContext;
use crate::types::{Instance, ParameterDescriptor, PropertyDescriptor, TypeKey};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Resolver function bound to a call tree.
pub type ResolveFn = Arc<
    dyn for<'a, 'r> Fn(&'a mut ResolutionContext<'r>) -> Result<Instance, ResolveError>
        + Send
        + Sync,
>;

/// Wraps a closure as a `ResolveFn`.
pub fn resolve_fn<F>(resolver: F) -> ResolveFn
where
    F: for<'a, 'r> Fn(&'a mut ResolutionContext<'r>) -> Result<Instance, ResolveError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(resolver)
}

/// **PRE-BUILT RESOLUTION POLICY**
pub trait Resolve: Send + Sync {
    fn resolve(&self, ctx: &mut ResolutionContext<'_>) -> Result<Instance, ResolveError>;
}

/// **RESOLVER FACTORY**
///
/// **PURPOSE**: Produces a resolver specialized to a target type, or `None`
/// when it has nothing to offer for that type
pub trait ResolverFactory: Send + Sync {
    fn resolver_for(&self, ty: &TypeKey) -> Option<ResolveFn>;
}

/// **INJECTION VALUE**
///
/// One variant per recognized value shape; resolution dispatches with a match.
#[derive(Clone)]
pub enum InjectionValue {
    /// No injection value specified: resolve the member's declared type.
    Inject,
    Resolver(ResolveFn),
    Policy(Arc<dyn Resolve>),
    Factory(Arc<dyn ResolverFactory>),
    /// A type token.
    Type(TypeKey),
    Value(Instance),
}

impl InjectionValue {
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        InjectionValue::Value(Arc::new(value))
    }

    pub fn resolver<F>(resolver: F) -> Self
    where
        F: for<'a, 'r> Fn(&'a mut ResolutionContext<'r>) -> Result<Instance, ResolveError>
            + Send
            + Sync
            + 'static,
    {
        InjectionValue::Resolver(resolve_fn(resolver))
    }

    pub fn policy(policy: impl Resolve + 'static) -> Self {
        InjectionValue::Policy(Arc::new(policy))
    }

    pub fn factory(factory: impl ResolverFactory + 'static) -> Self {
        InjectionValue::Factory(Arc::new(factory))
    }

    /// Values that are already resolved.
    pub(crate) fn literal(&self) -> Option<Instance> {
        match self {
            InjectionValue::Value(instance) => Some(instance.clone()),
            InjectionValue::Type(token) => Some(Arc::new(token.clone())),
            _ => None,
        }
    }

    /// Resolver specialized to `declared`, used when this value is carried
    /// by an override.
    pub(crate) fn resolver_for(&self, declared: &TypeKey) -> Option<ResolveFn> {
        match self {
            InjectionValue::Inject => {
                let ty = declared.clone();
                Some(resolve_fn(move |ctx| ctx.resolve(&ty, None)))
            }
            InjectionValue::Resolver(resolver) => Some(resolver.clone()),
            InjectionValue::Policy(policy) => {
                let policy = Arc::clone(policy);
                Some(resolve_fn(move |ctx| policy.resolve(ctx)))
            }
            InjectionValue::Factory(factory) => factory.resolver_for(declared),
            InjectionValue::Type(_) | InjectionValue::Value(_) => None,
        }
    }
}

impl fmt::Debug for InjectionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectionValue::Inject => f.write_str("Inject"),
            InjectionValue::Resolver(_) => f.write_str("Resolver(..)"),
            InjectionValue::Policy(_) => f.write_str("Policy(..)"),
            InjectionValue::Factory(_) => f.write_str("Factory(..)"),
            InjectionValue::Type(token) => write!(f, "Type({})", token),
            InjectionValue::Value(_) => f.write_str("Value(..)"),
        }
    }
}

/// **RESOLVER OVERRIDE**
///
/// Each variant declares which member descriptors it can compare itself with.
#[derive(Debug, Clone)]
pub enum ResolverOverride {
    Parameter {
        name: String,
        declaring: Option<TypeKey>,
        target_type: Option<TypeKey>,
        value: InjectionValue,
    },
    Property {
        name: String,
        declaring: Option<TypeKey>,
        value: InjectionValue,
    },
    /// Matches any parameter or property whose declared type is `ty`.
    Dependency { ty: TypeKey, value: InjectionValue },
}

impl ResolverOverride {
    pub fn parameter(name: impl Into<String>, value: InjectionValue) -> Self {
        ResolverOverride::Parameter {
            name: name.into(),
            declaring: None,
            target_type: None,
            value,
        }
    }

    pub fn property(name: impl Into<String>, value: InjectionValue) -> Self {
        ResolverOverride::Property {
            name: name.into(),
            declaring: None,
            value,
        }
    }

    pub fn dependency(ty: TypeKey, value: InjectionValue) -> Self {
        ResolverOverride::Dependency { ty, value }
    }

    /// Restricts a parameter or property override to members of `ty`.
    pub fn on_type(mut self, ty: TypeKey) -> Self {
        match &mut self {
            ResolverOverride::Parameter { declaring, .. }
            | ResolverOverride::Property { declaring, .. } => *declaring = Some(ty),
            ResolverOverride::Dependency { .. } => {}
        }
        self
    }

    /// Restricts a parameter override to parameters declared as `ty`.
    pub fn of_type(mut self, ty: TypeKey) -> Self {
        if let ResolverOverride::Parameter { target_type, .. } = &mut self {
            *target_type = Some(ty);
        }
        self
    }

    pub fn value(&self) -> &InjectionValue {
        match self {
            ResolverOverride::Parameter { value, .. }
            | ResolverOverride::Property { value, .. }
            | ResolverOverride::Dependency { value, .. } => value,
        }
    }

    pub fn matches_parameter(&self, parameter: &ParameterDescriptor) -> bool {
        match self {
            ResolverOverride::Parameter {
                name,
                declaring,
                target_type,
                ..
            } => {
                *name == parameter.name
                    && declaring.as_ref().map_or(true, |ty| *ty == parameter.declaring)
                    && target_type.as_ref().map_or(true, |ty| *ty == parameter.ty)
            }
            ResolverOverride::Dependency { ty, .. } => *ty == parameter.ty,
            ResolverOverride::Property { .. } => false,
        }
    }

    pub fn matches_property(&self, property: &PropertyDescriptor) -> bool {
        match self {
            ResolverOverride::Property {
                name, declaring, ..
            } => {
                *name == property.name
                    && declaring.as_ref().map_or(true, |ty| *ty == property.declaring)
            }
            ResolverOverride::Dependency { ty, .. } => *ty == property.ty,
            ResolverOverride::Parameter { .. } => false,
        }
    }
}

/// **OVERRIDE MATCHER**
///
/// Yields the overrides applicable to a member, last supplied first, so the
/// most recently supplied match wins.
#[derive(Clone, Copy)]
pub struct OverrideMatcher<'a> {
    overrides: &'a [ResolverOverride],
}

impl<'a> OverrideMatcher<'a> {
    pub fn new(overrides: &'a [ResolverOverride]) -> Self {
        Self { overrides }
    }

    pub fn for_parameter(
        self,
        parameter: &'a ParameterDescriptor,
    ) -> impl Iterator<Item = &'a ResolverOverride> + 'a {
        self.overrides
            .iter()
            .rev()
            .filter(move |candidate| candidate.matches_parameter(parameter))
    }

    pub fn for_property(
        self,
        property: &'a PropertyDescriptor,
    ) -> impl Iterator<Item = &'a ResolverOverride> + 'a {
        self.overrides
            .iter()
            .rev()
            .filter(move |candidate| candidate.matches_property(property))
    }
}
