use crate::build::steps::{LifetimeStep, MappingStep, PlanStep};
use crate::errors::ResolveError;
use crate::resolution::ResolutionContext;
use crate::types::Instance;
use std::fmt;
use std::sync::Arc;

/// **BUILD STEP**
///
/// **MANDATE**: Steps MUST NOT overwrite a result once the build is complete;
/// the context refuses such writes.
pub trait BuildStep: Send + Sync {
    fn pre_build_up(&self, ctx: &mut ResolutionContext<'_>) -> Result<(), ResolveError>;

    fn post_build_up(&self, _ctx: &mut ResolutionContext<'_>) -> Result<(), ResolveError> {
        Ok(())
    }
}

/// **BUILD CHAIN** - Ordered steps executed per resolution
#[derive(Clone, Default)]
pub struct BuildChain {
    steps: Vec<Arc<dyn BuildStep>>,
}

impl BuildChain {
    pub fn new(steps: Vec<Arc<dyn BuildStep>>) -> Self {
        Self { steps }
    }

    /// Lifetime lookup, type mapping, then the registration's build plan.
    pub fn standard() -> Self {
        Self::new(vec![
            Arc::new(LifetimeStep),
            Arc::new(MappingStep),
            Arc::new(PlanStep),
        ])
    }

    pub fn push(&mut self, step: Arc<dyn BuildStep>) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// **EXECUTE CHAIN**
    ///
    /// **STEP 1**: Pre-build phase in order, stopping after the step that
    /// completes the build
    /// **STEP 2**: Post-build phase in reverse for every step that ran
    /// **STEP 3**: Hand back the result slot
    ///
    /// Errors are returned as raised; post-build phases do not run after a
    /// failure.
    pub fn execute(&self, ctx: &mut ResolutionContext<'_>) -> Result<Instance, ResolveError> {
        let mut executed = 0;
        for step in &self.steps {
            step.pre_build_up(ctx)?;
            executed += 1;
            if ctx.is_build_complete() {
                break;
            }
        }

        for step in self.steps[..executed].iter().rev() {
            step.post_build_up(ctx)?;
        }

        match ctx.existing() {
            Some(instance) => Ok(instance.clone()),
            None => Err(ResolveError::ResolutionFailed {
                key: ctx.build_key().clone(),
                path: ctx.path(),
                message: "Build chain produced no instance".to_string(),
            }),
        }
    }
}

impl fmt::Debug for BuildChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildChain")
            .field("steps", &self.steps.len())
            .finish()
    }
}
