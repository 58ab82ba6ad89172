//! # INJECTA TYPE DEFINITIONS
//!
//! **CRITICAL**: Identities shared by every layer of the resolution engine
//! **MANDATE**: Registrations, policies and contexts MUST be keyed by these types

use crate::errors::{error_codes, ResolveError};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// **RESOLVED INSTANCE**
///
/// Type-erased result of a resolution. Trait-object services are stored as
/// `Arc<Arc<dyn Trait>>`, concrete services as `Arc<T>`.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// **GENERIC DEFINITION**
///
/// **PURPOSE**: Names an unbound generic contract and its number of arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenericDefinition {
    name: &'static str,
    arity: usize,
}

impl GenericDefinition {
    /// **SEQUENCE CONTRACT** - "sequence of T", resolved by enumerating registrations
    pub const SEQUENCE: GenericDefinition = GenericDefinition::new("Sequence", 1);

    pub const fn new(name: &'static str, arity: usize) -> Self {
        Self { name, arity }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }
}

/// **TYPE KEY**
///
/// **PURPOSE**: The "type" half of every identity the container deals with
/// **GUARANTEE**: Equality is structural; two closed generics are equal when
/// their definitions and arguments are equal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// Any `'static` Rust type, trait objects included.
    Concrete { id: TypeId, name: &'static str },
    /// A generic contract closed over concrete arguments.
    Generic {
        definition: GenericDefinition,
        arguments: Arc<[TypeKey]>,
    },
    /// An unbound generic definition.
    Open(GenericDefinition),
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeKey::Concrete {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// **CLOSED GENERIC CONSTRUCTOR**
    ///
    /// **RETURNS**: `InvalidConfiguration` when the argument count does not
    /// match the definition's arity
    pub fn generic(
        definition: GenericDefinition,
        arguments: impl IntoIterator<Item = TypeKey>,
    ) -> Result<Self, ResolveError> {
        let arguments: Vec<TypeKey> = arguments.into_iter().collect();
        if arguments.len() != definition.arity() {
            return Err(ResolveError::invalid_configuration(
                error_codes::GENERIC_ARITY,
                format!(
                    "{} expects {} type argument(s), got {}",
                    definition.name(),
                    definition.arity(),
                    arguments.len()
                ),
            ));
        }
        Ok(TypeKey::Generic {
            definition,
            arguments: arguments.into(),
        })
    }

    pub fn open(definition: GenericDefinition) -> Self {
        TypeKey::Open(definition)
    }

    pub fn sequence_of(element: TypeKey) -> Self {
        TypeKey::Generic {
            definition: GenericDefinition::SEQUENCE,
            arguments: Arc::from(vec![element]),
        }
    }

    /// The "type" meta-type; parameters declared with it receive type tokens.
    pub fn meta() -> Self {
        TypeKey::of::<TypeKey>()
    }

    pub fn is_open_definition(&self) -> bool {
        matches!(self, TypeKey::Open(_))
    }

    pub fn is_closed_generic(&self) -> bool {
        matches!(self, TypeKey::Generic { .. })
    }

    /// The open definition a closed generic was built from.
    pub fn generic_definition(&self) -> Option<TypeKey> {
        match self {
            TypeKey::Generic { definition, .. } => Some(TypeKey::Open(*definition)),
            _ => None,
        }
    }

    pub fn arguments(&self) -> &[TypeKey] {
        match self {
            TypeKey::Generic { arguments, .. } => arguments,
            _ => &[],
        }
    }

    pub fn sequence_element(&self) -> Option<&TypeKey> {
        match self {
            TypeKey::Generic {
                definition,
                arguments,
            } if *definition == GenericDefinition::SEQUENCE => arguments.first(),
            _ => None,
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKey::Concrete { name, .. } => f.write_str(name),
            TypeKey::Generic {
                definition,
                arguments,
            } => {
                write!(f, "{}<", definition.name())?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                f.write_str(">")
            }
            TypeKey::Open(definition) => {
                let blanks = vec!["_"; definition.arity()].join(", ");
                write!(f, "{}<{}>", definition.name(), blanks)
            }
        }
    }
}

/// **BUILD KEY**
///
/// **PURPOSE**: (type, optional name) identity of registrations and contexts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildKey {
    pub ty: TypeKey,
    pub name: Option<String>,
}

impl BuildKey {
    pub fn new(ty: TypeKey, name: Option<String>) -> Self {
        Self { ty, name }
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeKey::of::<T>(), None)
    }

    pub fn named(ty: TypeKey, name: impl Into<String>) -> Self {
        Self::new(ty, Some(name.into()))
    }

    pub fn matches(&self, ty: &TypeKey, name: Option<&str>) -> bool {
        self.ty == *ty && self.name.as_deref() == name
    }
}

impl fmt::Display for BuildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}[{}]", self.ty, name),
            None => write!(f, "{}", self.ty),
        }
    }
}

/// **CONSTRUCTOR PARAMETER DESCRIPTOR**
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterDescriptor {
    /// **DECLARING TYPE** - Type whose constructor owns the parameter
    pub declaring: TypeKey,

    /// **PARAMETER NAME**
    pub name: String,

    /// **POSITION** - Zero-based index in the argument list
    pub position: usize,

    /// **DECLARED TYPE**
    pub ty: TypeKey,
}

impl ParameterDescriptor {
    pub fn new(declaring: TypeKey, name: impl Into<String>, position: usize, ty: TypeKey) -> Self {
        Self {
            declaring,
            name: name.into(),
            position,
            ty,
        }
    }
}

/// **SETTABLE PROPERTY DESCRIPTOR**
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyDescriptor {
    pub declaring: TypeKey,
    pub name: String,
    pub ty: TypeKey,
}

impl PropertyDescriptor {
    pub fn new(declaring: TypeKey, name: impl Into<String>, ty: TypeKey) -> Self {
        Self {
            declaring,
            name: name.into(),
            ty,
        }
    }
}

/// Downcasts an instance, reporting the key it was resolved for on failure.
pub fn downcast_instance<T: Any + Send + Sync>(
    instance: Instance,
    key: &BuildKey,
) -> Result<Arc<T>, ResolveError> {
    instance
        .downcast::<T>()
        .map_err(|_| ResolveError::TypeMismatch {
            key: key.clone(),
            expected: std::any::type_name::<T>().to_string(),
        })
}
