use crate::errors::{error_codes, ResolveError};
use crate::resolution::{resolve_fn, InjectionValue, ResolutionContext, ResolveFn};
use crate::types::{downcast_instance, BuildKey, Instance, ParameterDescriptor, PropertyDescriptor, TypeKey};
use std::any::Any;
use std::sync::Arc;

/// **BUILD PLAN**
///
/// **PURPOSE**: Produces the instance of a registration, stored through the
/// context's result slot
pub trait BuildPlan: Send + Sync {
    fn build_up(&self, ctx: &mut ResolutionContext<'_>) -> Result<(), ResolveError>;
}

/// Calls a closure with the context. Nothing is cached here.
pub struct FactoryPlan {
    factory: ResolveFn,
}

impl FactoryPlan {
    pub fn new<F>(factory: F) -> Self
    where
        F: for<'a, 'r> Fn(&'a mut ResolutionContext<'r>) -> Result<Instance, ResolveError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            factory: resolve_fn(factory),
        }
    }
}

impl BuildPlan for FactoryPlan {
    fn build_up(&self, ctx: &mut ResolutionContext<'_>) -> Result<(), ResolveError> {
        if ctx.existing().is_some() {
            return Ok(());
        }
        let instance = (self.factory)(ctx)?;
        ctx.complete(instance);
        Ok(())
    }
}

/// A parameter or property together with the value injected into it.
#[derive(Debug, Clone)]
pub struct InjectionMember<D> {
    pub descriptor: D,
    pub name: Option<String>,
    pub value: InjectionValue,
}

/// **RESOLVED CONSTRUCTOR ARGUMENTS**
///
/// Parameters are kept in declaration order, properties by name.
#[derive(Debug)]
pub struct Arguments {
    key: BuildKey,
    parameters: Vec<Instance>,
    properties: Vec<(String, Instance)>,
}

impl Arguments {
    /// Identity being built; a closed generic exposes its arguments here.
    pub fn key(&self) -> &BuildKey {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn parameter<T: Any + Send + Sync>(&self, position: usize) -> Result<Arc<T>, ResolveError> {
        let instance = self.parameters.get(position).ok_or_else(|| {
            ResolveError::invalid_configuration(
                error_codes::MISSING_ARGUMENT,
                format!("{} has no parameter at position {}", self.key, position),
            )
        })?;
        downcast_instance(instance.clone(), &self.key)
    }

    /// Trait-object parameter, unwrapped from its `Arc<Arc<dyn Trait>>` storage.
    pub fn service<D: ?Sized + Send + Sync + 'static>(&self, position: usize) -> Result<Arc<D>, ResolveError> {
        Ok(self.parameter::<Arc<D>>(position)?.as_ref().clone())
    }

    pub fn property<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ResolveError> {
        let instance = self
            .properties
            .iter()
            .find(|(property, _)| property == name)
            .map(|(_, instance)| instance.clone())
            .ok_or_else(|| {
                ResolveError::invalid_configuration(
                    error_codes::MISSING_ARGUMENT,
                    format!("{} has no property '{}'", self.key, name),
                )
            })?;
        downcast_instance(instance, &self.key)
    }
}

type Activator = Arc<dyn Fn(Arguments) -> Result<Instance, ResolveError> + Send + Sync>;
type Initializer = Arc<dyn Fn(&Instance, &Arguments) -> Result<(), ResolveError> + Send + Sync>;

/// **CONSTRUCTOR PLAN**
///
/// **STEP 1**: Resolve every parameter through `resolve_parameter`
/// **STEP 2**: Resolve every property through `resolve_property`
/// **STEP 3**: Hand the arguments to the activator
///
/// When the result slot already holds an object (build-up of an existing
/// instance) only properties are resolved and passed to the initializer.
pub struct ConstructorPlan {
    declaring: TypeKey,
    parameters: Vec<InjectionMember<ParameterDescriptor>>,
    properties: Vec<InjectionMember<PropertyDescriptor>>,
    activator: Activator,
    initializer: Option<Initializer>,
}

impl ConstructorPlan {
    pub fn new(
        declaring: TypeKey,
        activator: impl Fn(Arguments) -> Result<Instance, ResolveError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            declaring,
            parameters: Vec::new(),
            properties: Vec::new(),
            activator: Arc::new(activator),
            initializer: None,
        }
    }

    pub fn parameter(self, name: impl Into<String>, ty: TypeKey, value: InjectionValue) -> Self {
        self.push_parameter(name.into(), ty, None, value)
    }

    /// Parameter resolved against a named registration of its type.
    pub fn named_parameter(
        self,
        name: impl Into<String>,
        ty: TypeKey,
        registration: impl Into<String>,
    ) -> Self {
        self.push_parameter(name.into(), ty, Some(registration.into()), InjectionValue::Inject)
    }

    fn push_parameter(
        mut self,
        name: String,
        ty: TypeKey,
        registration: Option<String>,
        value: InjectionValue,
    ) -> Self {
        let position = self.parameters.len();
        self.parameters.push(InjectionMember {
            descriptor: ParameterDescriptor::new(self.declaring.clone(), name, position, ty),
            name: registration,
            value,
        });
        self
    }

    pub fn property(mut self, name: impl Into<String>, ty: TypeKey, value: InjectionValue) -> Self {
        self.properties.push(InjectionMember {
            descriptor: PropertyDescriptor::new(self.declaring.clone(), name, ty),
            name: None,
            value,
        });
        self
    }

    pub fn initializer(
        mut self,
        initializer: impl Fn(&Instance, &Arguments) -> Result<(), ResolveError> + Send + Sync + 'static,
    ) -> Self {
        self.initializer = Some(Arc::new(initializer));
        self
    }

    pub fn parameters(&self) -> &[InjectionMember<ParameterDescriptor>] {
        &self.parameters
    }

    pub fn properties(&self) -> &[InjectionMember<PropertyDescriptor>] {
        &self.properties
    }

    fn resolve_properties(
        &self,
        ctx: &mut ResolutionContext<'_>,
    ) -> Result<Vec<(String, Instance)>, ResolveError> {
        self.properties
            .iter()
            .map(|member| {
                let instance =
                    ctx.resolve_property(&member.descriptor, member.name.as_deref(), &member.value)?;
                Ok((member.descriptor.name.clone(), instance))
            })
            .collect()
    }
}

impl BuildPlan for ConstructorPlan {
    fn build_up(&self, ctx: &mut ResolutionContext<'_>) -> Result<(), ResolveError> {
        if let Some(existing) = ctx.existing().cloned() {
            if let Some(initializer) = &self.initializer {
                let arguments = Arguments {
                    key: ctx.build_key().clone(),
                    parameters: Vec::new(),
                    properties: self.resolve_properties(ctx)?,
                };
                initializer(&existing, &arguments)?;
            }
            ctx.set_build_complete();
            return Ok(());
        }

        let mut parameters = Vec::with_capacity(self.parameters.len());
        for member in &self.parameters {
            parameters.push(ctx.resolve_parameter(
                &member.descriptor,
                member.name.as_deref(),
                &member.value,
            )?);
        }
        let arguments = Arguments {
            key: ctx.build_key().clone(),
            parameters,
            properties: self.resolve_properties(ctx)?,
        };

        let instance = (self.activator)(arguments)?;
        ctx.complete(instance);
        Ok(())
    }
}
