use crate::build::plans::BuildPlan;
use crate::dependencies::Registration;
use crate::errors::{error_codes, ResolveError};
use crate::lifetime::PerBuildLifetime;
use crate::policy::Policy;
use crate::resolution::ResolutionContext;
use crate::types::{downcast_instance, BuildKey, Instance, TypeKey};
use std::any::Any;
use std::sync::Arc;

/// **RESOLVED SEQUENCE**
///
/// **PURPOSE**: Result of resolving `Sequence<T>`
/// **GUARANTEE**: Items follow registry insertion order
#[derive(Debug, Clone)]
pub struct Sequence {
    element: TypeKey,
    items: Vec<Instance>,
}

impl Sequence {
    pub fn new(element: TypeKey, items: Vec<Instance>) -> Self {
        Self { element, items }
    }

    pub fn element(&self) -> &TypeKey {
        &self.element
    }

    pub fn items(&self) -> &[Instance] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.items.iter()
    }

    /// Projects every item into `Arc<E>`.
    pub fn cast<E: Any + Send + Sync>(&self) -> Result<Vec<Arc<E>>, ResolveError> {
        let key = BuildKey::new(self.element.clone(), None);
        self.items
            .iter()
            .map(|item| downcast_instance::<E>(item.clone(), &key))
            .collect()
    }

    /// Projects trait-object items stored as `Arc<Arc<dyn Trait>>`.
    pub fn services<D: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<D>>, ResolveError> {
        Ok(self
            .cast::<Arc<D>>()?
            .into_iter()
            .map(|service| service.as_ref().clone())
            .collect())
    }
}

/// **COLLECTION PLAN**
///
/// **PURPOSE**: Builds `Sequence<T>` from every registration of `T`, or of
/// the open definition `T` was closed from
/// **GUARANTEE**: The sequence is cached for the rest of the call tree only
#[derive(Debug, Default, Clone, Copy)]
pub struct CollectionPlan;

impl CollectionPlan {
    /// Registration synthesized for a `Sequence<T>` request with no explicit
    /// registration of its own.
    pub fn registration(key: BuildKey) -> Registration {
        Registration::builder(key.ty)
            .with_name(key.name)
            .plan(CollectionPlan)
            .build()
    }

    fn collect(&self, ctx: &mut ResolutionContext<'_>) -> Result<Sequence, ResolveError> {
        let element = ctx.ty().sequence_element().cloned().ok_or_else(|| {
            ResolveError::invalid_configuration(
                error_codes::NOT_A_SEQUENCE,
                format!("{} is not a sequence contract", ctx.ty()),
            )
        })?;
        if element.is_open_definition() {
            return Err(ResolveError::invalid_configuration(
                error_codes::OPEN_GENERIC_ELEMENT,
                format!("Cannot enumerate instances of open generic {}", element),
            ));
        }

        let definition = element.generic_definition();
        let names: Vec<Option<String>> = ctx
            .registry()
            .registrations()
            .into_iter()
            .filter(|entry| {
                entry.registered_type == element
                    || definition.as_ref() == Some(&entry.registered_type)
            })
            .map(|entry| entry.name)
            .collect();

        log::debug!(
            "Synthesizing {} with {} element(s)",
            ctx.build_key(),
            names.len()
        );

        let mut items = Vec::with_capacity(names.len());
        for name in &names {
            items.push(ctx.resolve(&element, name.as_deref())?);
        }
        Ok(Sequence::new(element, items))
    }
}

impl BuildPlan for CollectionPlan {
    fn build_up(&self, ctx: &mut ResolutionContext<'_>) -> Result<(), ResolveError> {
        if ctx.existing().is_none() {
            let sequence: Instance = Arc::new(self.collect(ctx)?);
            ctx.complete(sequence);
        }
        if let Some(sequence) = ctx.existing().cloned() {
            let key = ctx.build_key().clone();
            ctx.set_policy(
                &key.ty,
                key.name.as_deref(),
                Policy::Lifetime(Arc::new(PerBuildLifetime::new(sequence))),
            );
        }
        ctx.set_build_complete();
        Ok(())
    }
}
