//! Standard build steps.

use crate::build::chain::BuildStep;
use crate::errors::ResolveError;
use crate::policy::{Policy, PolicyKind};
use crate::resolution::ResolutionContext;
use std::sync::Arc;

/// Serves cached instances from the `Lifetime` policy and hands new ones to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LifetimeStep;

impl BuildStep for LifetimeStep {
    fn pre_build_up(&self, ctx: &mut ResolutionContext<'_>) -> Result<(), ResolveError> {
        if ctx.existing().is_some() {
            return Ok(());
        }
        if let Some(Policy::Lifetime(manager)) = ctx.own_policy(PolicyKind::Lifetime) {
            if let Some(value) = manager.get_value() {
                log::trace!("Lifetime hit for {}", ctx.build_key());
                ctx.complete(value);
            }
        }
        Ok(())
    }

    fn post_build_up(&self, ctx: &mut ResolutionContext<'_>) -> Result<(), ResolveError> {
        if let Some(Policy::Lifetime(manager)) = ctx.own_policy(PolicyKind::Lifetime) {
            if let Some(value) = ctx.existing().cloned() {
                let stored = manager.set_value(value.clone(), ctx.lifetime());
                if !Arc::ptr_eq(&stored, &value) {
                    log::trace!("Lifetime kept an earlier instance for {}", ctx.build_key());
                    ctx.replace_existing(stored);
                }
            }
        }
        Ok(())
    }
}

/// Resolves the `Mapping` target in place of the requested identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct MappingStep;

impl BuildStep for MappingStep {
    fn pre_build_up(&self, ctx: &mut ResolutionContext<'_>) -> Result<(), ResolveError> {
        if ctx.existing().is_some() {
            return Ok(());
        }
        let Some(Policy::Mapping(mapping)) = ctx.own_policy(PolicyKind::Mapping) else {
            return Ok(());
        };

        let target = &mapping.target;
        let value = ctx.resolve(&target.ty, target.name.as_deref())?;
        let value = match &mapping.project {
            Some(project) => project(value, ctx.build_key())?,
            None => value,
        };
        ctx.complete(value);
        Ok(())
    }
}

/// Runs the registration's `Plan` policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanStep;

impl BuildStep for PlanStep {
    fn pre_build_up(&self, ctx: &mut ResolutionContext<'_>) -> Result<(), ResolveError> {
        match ctx.own_policy(PolicyKind::Plan) {
            Some(Policy::Plan(plan)) => plan.build_up(ctx),
            _ if ctx.existing().is_some() => Ok(()),
            _ => Err(ResolveError::ResolutionFailed {
                key: ctx.build_key().clone(),
                path: ctx.path(),
                message: "No build plan and no mapping for this registration".to_string(),
            }),
        }
    }
}
