pub mod context;
pub mod overrides;

pub use context::ResolutionContext;
pub use overrides::{
    resolve_fn, InjectionValue, OverrideMatcher, Resolve, ResolveFn, ResolverFactory,
    ResolverOverride,
};

#[cfg(test)]
mod tests;
