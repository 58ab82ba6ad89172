use crate::build::{BuildChain, BuildStep, ConstructorPlan, LifetimeStep, MappingStep, PlanStep};
use crate::config::ResolverConfig;
use crate::dependencies::{Container, Registration};
use crate::errors::{error_codes, ResolveError};
use crate::policy::{Policy, PolicyKind};
use crate::resolution::{
    resolve_fn, InjectionValue, Resolve, ResolutionContext, ResolveFn, ResolverFactory,
    ResolverOverride,
};
use crate::types::{downcast_instance, BuildKey, GenericDefinition, Instance, TypeKey};
use parking_lot::Mutex;
use serde_json::json;
use std::any::Any;
use std::sync::Arc;

#[cfg(test)]
mod tests {
    use super::*;

    struct Outer;
    struct Inner;

    #[derive(Debug)]
    struct Observed {
        depth: usize,
        parent: Option<BuildKey>,
        path: Vec<BuildKey>,
    }

    fn observe(ctx: &ResolutionContext<'_>) -> Instance {
        Arc::new(Observed {
            depth: ctx.depth(),
            parent: ctx.parent_key().cloned(),
            path: ctx.path(),
        })
    }

    fn resolve_observed(container: &Container, ty: TypeKey) -> Arc<Observed> {
        let instance = container.resolve(&ty, None).unwrap();
        downcast_instance::<Observed>(instance, &BuildKey::new(ty, None)).unwrap()
    }

    struct NoResolver;

    impl ResolverFactory for NoResolver {
        fn resolver_for(&self, _ty: &TypeKey) -> Option<ResolveFn> {
            None
        }
    }

    /// Yields the display name of the type it was specialized to.
    struct TypeNameFactory;

    impl ResolverFactory for TypeNameFactory {
        fn resolver_for(&self, ty: &TypeKey) -> Option<ResolveFn> {
            let name = ty.to_string();
            Some(resolve_fn(move |_| Ok(Arc::new(name.clone()) as Instance)))
        }
    }

    struct Fixed(u16);

    impl Resolve for Fixed {
        fn resolve(&self, _ctx: &mut ResolutionContext<'_>) -> Result<Instance, ResolveError> {
            Ok(Arc::new(self.0) as Instance)
        }
    }

    /// Registers `u16` as 7 and a single-parameter `Outer` constructor that
    /// echoes the `u16` it receives.
    fn port_container(value: InjectionValue) -> Container {
        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<u16>())
                .factory(|_| Ok(Arc::new(7u16) as Instance))
                .build(),
        );
        container.register(
            Registration::builder(TypeKey::of::<Outer>())
                .constructor(
                    ConstructorPlan::new(TypeKey::of::<Outer>(), |args| {
                        Ok(args.parameter::<u16>(0)? as Instance)
                    })
                    .parameter("port", TypeKey::of::<u16>(), value),
                )
                .build(),
        );
        container
    }

    fn resolve_port(container: &Container, overrides: Vec<ResolverOverride>) -> Result<u16, ResolveError> {
        let instance = container.resolve_with(&TypeKey::of::<Outer>(), None, overrides)?;
        Ok(*downcast_instance::<u16>(instance, &BuildKey::of::<u16>())?)
    }

    // **FRAME STACK TESTS**
    #[test]
    fn test_child_frame_depth_and_parent() {
        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<Inner>())
                .factory(|ctx| Ok(observe(ctx)))
                .build(),
        );
        container.register(
            Registration::builder(TypeKey::of::<Outer>())
                .factory(|ctx| ctx.resolve(&TypeKey::of::<Inner>(), None))
                .build(),
        );

        let observed = resolve_observed(&container, TypeKey::of::<Outer>());
        assert_eq!(observed.depth, 2);
        assert_eq!(observed.parent, Some(BuildKey::of::<Outer>()));
        assert_eq!(
            observed.path,
            vec![BuildKey::of::<Outer>(), BuildKey::of::<Inner>()]
        );
    }

    #[test]
    fn test_frame_popped_after_child_returns() {
        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<u8>())
                .factory(|_| Ok(Arc::new(1u8) as Instance))
                .build(),
        );
        container.register(
            Registration::builder(TypeKey::of::<Outer>())
                .factory(|ctx| {
                    ctx.resolve(&TypeKey::of::<u8>(), None)?;
                    Ok(observe(ctx))
                })
                .build(),
        );

        let observed = resolve_observed(&container, TypeKey::of::<Outer>());
        assert_eq!(observed.depth, 1);
        assert_eq!(observed.parent, None);
    }

    #[test]
    fn test_sibling_context_shares_identity() {
        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<Outer>())
                .factory(|ctx| {
                    let replacement: Instance = Arc::new(5u32);
                    let seen = ctx.with_existing(Some(replacement), |sibling| {
                        assert_eq!(sibling.build_key(), &BuildKey::of::<Outer>());
                        assert_eq!(sibling.depth(), 2);
                        Ok(sibling.existing().cloned())
                    })?;
                    assert!(seen.is_some());
                    assert!(ctx.existing().is_none());
                    Ok(observe(ctx))
                })
                .build(),
        );

        let observed = resolve_observed(&container, TypeKey::of::<Outer>());
        assert_eq!(observed.depth, 1);
    }

    #[test]
    fn test_sibling_context_sees_call_tree_overrides() {
        let container = port_container(InjectionValue::Inject);
        container.register(
            Registration::builder(TypeKey::of::<Inner>())
                .factory(|ctx| {
                    let seen = ctx.with_existing(None, |sibling| Ok(sibling.overrides().len()))?;
                    Ok(Arc::new(seen) as Instance)
                })
                .build(),
        );

        let instance = container
            .resolve_with(
                &TypeKey::of::<Inner>(),
                None,
                vec![ResolverOverride::parameter("port", InjectionValue::value(3u16))],
            )
            .unwrap();
        assert_eq!(*downcast_instance::<usize>(instance, &BuildKey::of::<Inner>()).unwrap(), 1);
    }

    #[test]
    fn test_completed_result_not_overwritten() {
        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<u32>())
                .factory(|ctx| {
                    ctx.complete(Arc::new(1u32));
                    assert!(!ctx.set_existing(Arc::new(3u32)));
                    Ok(Arc::new(2u32) as Instance)
                })
                .build(),
        );

        assert_eq!(*container.resolve_as::<u32>(None).unwrap(), 1);
    }

    #[test]
    fn test_cycle_reported_as_circular_dependency() {
        struct A;
        struct B;

        let container = Container::with_config(ResolverConfig { max_depth: 8 });
        container.register(
            Registration::builder(TypeKey::of::<A>())
                .factory(|ctx| ctx.resolve(&TypeKey::of::<B>(), None))
                .build(),
        );
        container.register(
            Registration::builder(TypeKey::of::<B>())
                .factory(|ctx| ctx.resolve(&TypeKey::of::<A>(), None))
                .build(),
        );

        match container.resolve(&TypeKey::of::<A>(), None) {
            Err(ResolveError::CircularDependency { depth, path, .. }) => {
                assert_eq!(depth, 8);
                assert_eq!(path.len(), 9);
                assert_eq!(path[0], BuildKey::of::<A>());
                assert_eq!(path[1], BuildKey::of::<B>());
            }
            other => panic!("Expected CircularDependency, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_child_failure_propagates_unchanged() {
        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<Inner>())
                .factory(|_| {
                    Err(ResolveError::invalid_configuration(
                        error_codes::INVALID_CONFIG,
                        "inner refused",
                    ))
                })
                .build(),
        );
        container.register(
            Registration::builder(TypeKey::of::<Outer>())
                .factory(|ctx| ctx.resolve(&TypeKey::of::<Inner>(), None))
                .build(),
        );

        let err = container.resolve(&TypeKey::of::<Outer>(), None).unwrap_err();
        assert_eq!(err.code(), error_codes::INVALID_CONFIG);
        assert!(err.to_string().contains("inner refused"));
    }

    #[test]
    fn test_missing_dependency_reports_path() {
        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<Outer>())
                .factory(|ctx| ctx.resolve(&TypeKey::of::<Inner>(), Some("absent")))
                .build(),
        );

        match container.resolve(&TypeKey::of::<Outer>(), None) {
            Err(ResolveError::ResolutionFailed { key, path, .. }) => {
                assert_eq!(key, BuildKey::named(TypeKey::of::<Inner>(), "absent"));
                assert_eq!(path, vec![BuildKey::of::<Outer>(), key.clone()]);
            }
            other => panic!("Expected ResolutionFailed, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_failed_child_leaves_frame_intact() {
        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<Outer>())
                .factory(|ctx| {
                    let key = ctx.build_key().clone();
                    assert!(ctx.resolve(&TypeKey::of::<Inner>(), Some("absent")).is_err());
                    assert_eq!(ctx.build_key(), &key);
                    Ok(observe(ctx))
                })
                .build(),
        );

        let observed = resolve_observed(&container, TypeKey::of::<Outer>());
        assert_eq!(observed.depth, 1);
        assert_eq!(observed.parent, None);
        assert_eq!(observed.path, vec![BuildKey::of::<Outer>()]);
    }

    #[test]
    fn test_failure_deep_in_tree_unwinds_to_recovering_frame() {
        struct Leaf;

        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<Leaf>())
                .factory(|_| {
                    Err(ResolveError::invalid_configuration(
                        error_codes::INVALID_CONFIG,
                        "leaf refused",
                    ))
                })
                .build(),
        );
        container.register(
            Registration::builder(TypeKey::of::<u8>())
                .factory(|ctx| ctx.resolve(&TypeKey::of::<Leaf>(), None))
                .build(),
        );
        container.register(
            Registration::builder(TypeKey::of::<Inner>())
                .factory(|ctx| {
                    assert!(ctx.resolve(&TypeKey::of::<u8>(), None).is_err());
                    Ok(observe(ctx))
                })
                .build(),
        );
        container.register(
            Registration::builder(TypeKey::of::<Outer>())
                .factory(|ctx| ctx.resolve(&TypeKey::of::<Inner>(), None))
                .build(),
        );

        let observed = resolve_observed(&container, TypeKey::of::<Outer>());
        assert_eq!(observed.depth, 2);
        assert_eq!(observed.parent, Some(BuildKey::of::<Outer>()));
        assert_eq!(
            observed.path,
            vec![BuildKey::of::<Outer>(), BuildKey::of::<Inner>()]
        );
    }

    // **POLICY LOOKUP TESTS**
    fn settings(ctx: &ResolutionContext<'_>, ty: &TypeKey) -> Option<serde_json::Value> {
        ctx.get_policy(ty, None, PolicyKind::Settings)
            .and_then(|policy| policy.as_settings().cloned())
    }

    #[test]
    fn test_policy_lookup_tiers() {
        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<Inner>())
                .policy(Policy::Settings(json!("inner-intrinsic")))
                .factory(|_| Ok(Arc::new(()) as Instance))
                .build(),
        );
        container.register(
            Registration::builder(TypeKey::of::<Outer>())
                .policy(Policy::Settings(json!("intrinsic")))
                .factory(|ctx| {
                    let own = TypeKey::of::<Outer>();
                    let mut seen = vec![settings(ctx, &own)];
                    ctx.set_policy(&own, None, Policy::Settings(json!("local")));
                    seen.push(settings(ctx, &own));
                    ctx.clear_policy(&own, None, PolicyKind::Settings);
                    seen.push(settings(ctx, &own));
                    // another identity's intrinsic policies are never consulted
                    seen.push(settings(ctx, &TypeKey::of::<Inner>()));
                    Ok(Arc::new(seen) as Instance)
                })
                .build(),
        );
        container.set_policy(&TypeKey::of::<Outer>(), None, Policy::Settings(json!("container")));

        let instance = container.resolve(&TypeKey::of::<Outer>(), None).unwrap();
        let seen = downcast_instance::<Vec<Option<serde_json::Value>>>(instance, &BuildKey::of::<Outer>()).unwrap();
        assert_eq!(
            *seen,
            vec![
                Some(json!("container")),
                Some(json!("local")),
                Some(json!("container")),
                None,
            ]
        );

        container.clear_policy(&TypeKey::of::<Outer>(), None, PolicyKind::Settings);
        let instance = container.resolve(&TypeKey::of::<Outer>(), None).unwrap();
        let seen = downcast_instance::<Vec<Option<serde_json::Value>>>(instance, &BuildKey::of::<Outer>()).unwrap();
        assert_eq!(seen[0], Some(json!("intrinsic")));
    }

    #[test]
    fn test_local_policy_shared_with_children() {
        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<Inner>())
                .factory(|ctx| {
                    let value = ctx
                        .get_policy(&TypeKey::of::<u8>(), None, PolicyKind::Settings)
                        .and_then(|policy| policy.as_settings().cloned());
                    Ok(Arc::new(value) as Instance)
                })
                .build(),
        );
        container.register(
            Registration::builder(TypeKey::of::<Outer>())
                .factory(|ctx| {
                    ctx.set_policy(&TypeKey::of::<u8>(), None, Policy::Settings(json!(42)));
                    ctx.resolve(&TypeKey::of::<Inner>(), None)
                })
                .build(),
        );

        let instance = container.resolve(&TypeKey::of::<Outer>(), None).unwrap();
        let value = downcast_instance::<Option<serde_json::Value>>(instance, &BuildKey::of::<Outer>()).unwrap();
        assert_eq!(*value, Some(json!(42)));

        let instance = container.resolve(&TypeKey::of::<Inner>(), None).unwrap();
        let value = downcast_instance::<Option<serde_json::Value>>(instance, &BuildKey::of::<Inner>()).unwrap();
        assert_eq!(*value, None);
    }

    // **INJECTION VALUE TESTS**
    #[test]
    fn test_parameter_value_shapes() {
        assert_eq!(resolve_port(&port_container(InjectionValue::Inject), vec![]).unwrap(), 7);
        assert_eq!(resolve_port(&port_container(InjectionValue::value(9u16)), vec![]).unwrap(), 9);
        assert_eq!(resolve_port(&port_container(InjectionValue::policy(Fixed(11))), vec![]).unwrap(), 11);

        let resolver = InjectionValue::resolver(|ctx| {
            let base = ctx.resolve(&TypeKey::of::<u16>(), None)?;
            let base = downcast_instance::<u16>(base, &BuildKey::of::<u16>())?;
            Ok(Arc::new(*base + 1) as Instance)
        });
        assert_eq!(resolve_port(&port_container(resolver), vec![]).unwrap(), 8);
    }

    #[test]
    fn test_type_value_only_injected_into_meta_parameter() {
        let container = port_container(InjectionValue::Type(TypeKey::of::<String>()));
        assert_eq!(resolve_port(&container, vec![]).unwrap(), 7);

        struct Tagged;
        container.register(
            Registration::builder(TypeKey::of::<Tagged>())
                .constructor(
                    ConstructorPlan::new(TypeKey::of::<Tagged>(), |args| {
                        Ok(args.parameter::<TypeKey>(0)? as Instance)
                    })
                    .parameter("tag", TypeKey::meta(), InjectionValue::Type(TypeKey::of::<String>())),
                )
                .build(),
        );
        let token = container.resolve(&TypeKey::of::<Tagged>(), None).unwrap();
        let token = downcast_instance::<TypeKey>(token, &BuildKey::of::<Tagged>()).unwrap();
        assert_eq!(*token, TypeKey::of::<String>());
    }

    #[test]
    fn test_factory_without_resolver_is_invalid_configuration() {
        let container = port_container(InjectionValue::factory(NoResolver));
        let err = resolve_port(&container, vec![]).unwrap_err();
        assert_eq!(err.code(), error_codes::RESOLVER_UNAVAILABLE);
    }

    #[test]
    fn test_factory_specialized_to_type_being_built() {
        let handler = GenericDefinition::new("Handler", 1);
        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::open(handler))
                .constructor(
                    ConstructorPlan::new(TypeKey::open(handler), |args| {
                        Ok(args.parameter::<String>(0)? as Instance)
                    })
                    .parameter("label", TypeKey::of::<String>(), InjectionValue::factory(TypeNameFactory)),
                )
                .build(),
        );

        let closed = TypeKey::generic(handler, [TypeKey::of::<u8>()]).unwrap();
        let label = container.resolve(&closed, None).unwrap();
        let label = downcast_instance::<String>(label, &BuildKey::new(closed, None)).unwrap();
        assert_eq!(label.as_str(), "Handler<u8>");
    }

    // **OVERRIDE TESTS**
    #[test]
    fn test_last_matching_override_wins() {
        let container = port_container(InjectionValue::Inject);
        let port = resolve_port(
            &container,
            vec![
                ResolverOverride::parameter("port", InjectionValue::value(1u16)),
                ResolverOverride::dependency(TypeKey::of::<u16>(), InjectionValue::value(2u16)),
                ResolverOverride::parameter("other", InjectionValue::value(3u16)),
            ],
        )
        .unwrap();
        assert_eq!(port, 2);
    }

    #[test]
    fn test_override_without_resolver_defers_to_earlier() {
        let container = port_container(InjectionValue::Inject);
        let port = resolve_port(
            &container,
            vec![
                ResolverOverride::parameter("port", InjectionValue::value(5u16)),
                ResolverOverride::parameter("port", InjectionValue::factory(NoResolver)),
            ],
        )
        .unwrap();
        assert_eq!(port, 5);
    }

    #[test]
    fn test_overrides_reach_every_frame() {
        let container = port_container(InjectionValue::Inject);
        container.register(
            Registration::builder(TypeKey::of::<Inner>())
                .factory(|ctx| ctx.resolve(&TypeKey::of::<Outer>(), None))
                .build(),
        );

        let instance = container
            .resolve_with(
                &TypeKey::of::<Inner>(),
                None,
                vec![ResolverOverride::parameter("port", InjectionValue::value(12u16))
                    .on_type(TypeKey::of::<Outer>())],
            )
            .unwrap();
        assert_eq!(*downcast_instance::<u16>(instance, &BuildKey::of::<u16>()).unwrap(), 12);
    }

    #[test]
    fn test_inject_override_resolves_declared_type() {
        let container = port_container(InjectionValue::value(9u16));
        let port = resolve_port(
            &container,
            vec![ResolverOverride::parameter("port", InjectionValue::Inject)],
        )
        .unwrap();
        assert_eq!(port, 7);
    }

    // **PROPERTY INJECTION TESTS**
    struct Label(&'static str);

    impl Resolve for Label {
        fn resolve(&self, _ctx: &mut ResolutionContext<'_>) -> Result<Instance, ResolveError> {
            Ok(Arc::new(self.0.to_string()) as Instance)
        }
    }

    /// Registers `String` as "injected" and an `Outer` whose only member is
    /// the property `label`, returned as the built instance.
    fn label_container<T: Any + Send + Sync>(ty: TypeKey, value: InjectionValue) -> Container {
        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<String>())
                .factory(|_| Ok(Arc::new("injected".to_string()) as Instance))
                .build(),
        );
        container.register(
            Registration::builder(TypeKey::of::<Outer>())
                .constructor(
                    ConstructorPlan::new(TypeKey::of::<Outer>(), |args| {
                        Ok(args.property::<T>("label")? as Instance)
                    })
                    .property("label", ty, value),
                )
                .build(),
        );
        container
    }

    fn resolve_label(container: &Container, overrides: Vec<ResolverOverride>) -> String {
        let instance = container
            .resolve_with(&TypeKey::of::<Outer>(), None, overrides)
            .unwrap();
        downcast_instance::<String>(instance, &BuildKey::of::<String>())
            .unwrap()
            .as_str()
            .to_string()
    }

    fn string_label(value: InjectionValue) -> Container {
        label_container::<String>(TypeKey::of::<String>(), value)
    }

    #[test]
    fn test_last_matching_property_override_wins() {
        let container = string_label(InjectionValue::Inject);
        assert_eq!(resolve_label(&container, vec![]), "injected");

        let label = resolve_label(
            &container,
            vec![
                ResolverOverride::property("label", InjectionValue::value("first".to_string())),
                ResolverOverride::property("other", InjectionValue::value("unrelated".to_string())),
                ResolverOverride::property("label", InjectionValue::value("second".to_string())),
            ],
        );
        assert_eq!(label, "second");
    }

    #[test]
    fn test_property_override_scoped_by_declaring_type() {
        let container = string_label(InjectionValue::Inject);
        let label = resolve_label(
            &container,
            vec![
                ResolverOverride::property("label", InjectionValue::value("outer".to_string()))
                    .on_type(TypeKey::of::<Outer>()),
                ResolverOverride::property("label", InjectionValue::value("inner".to_string()))
                    .on_type(TypeKey::of::<Inner>()),
            ],
        );
        assert_eq!(label, "outer");
    }

    #[test]
    fn test_property_value_shapes() {
        let resolver = InjectionValue::resolver(|ctx| {
            let base = ctx.resolve(&TypeKey::of::<String>(), None)?;
            let base = downcast_instance::<String>(base, &BuildKey::of::<String>())?;
            Ok(Arc::new(format!("{}!", base)) as Instance)
        });
        assert_eq!(resolve_label(&string_label(resolver), vec![]), "injected!");
        assert_eq!(resolve_label(&string_label(InjectionValue::policy(Label("fixed"))), vec![]), "fixed");
        assert_eq!(
            resolve_label(&string_label(InjectionValue::value("literal".to_string())), vec![]),
            "literal"
        );

        let factory = string_label(InjectionValue::factory(TypeNameFactory));
        assert_eq!(resolve_label(&factory, vec![]), TypeKey::of::<Outer>().to_string());
    }

    #[test]
    fn test_property_type_value_yields_token() {
        let container = label_container::<TypeKey>(
            TypeKey::meta(),
            InjectionValue::Type(TypeKey::of::<u16>()),
        );
        let token = container.resolve(&TypeKey::of::<Outer>(), None).unwrap();
        let token = downcast_instance::<TypeKey>(token, &BuildKey::of::<Outer>()).unwrap();
        assert_eq!(*token, TypeKey::of::<u16>());
    }

    #[test]
    fn test_property_factory_without_resolver_is_invalid_configuration() {
        let container = string_label(InjectionValue::factory(NoResolver));
        let err = container.resolve(&TypeKey::of::<Outer>(), None).err().unwrap();
        assert_eq!(err.code(), error_codes::RESOLVER_UNAVAILABLE);
    }

    #[test]
    fn test_property_factory_override_specialized_to_declared_type() {
        let container = string_label(InjectionValue::Inject);
        let label = resolve_label(
            &container,
            vec![ResolverOverride::property("label", InjectionValue::factory(TypeNameFactory))],
        );
        assert_eq!(label, TypeKey::of::<String>().to_string());
    }

    // **BUILD CHAIN TESTS**
    struct Spy {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl BuildStep for Spy {
        fn pre_build_up(&self, _ctx: &mut ResolutionContext<'_>) -> Result<(), ResolveError> {
            self.log.lock().push(format!("pre {}", self.label));
            Ok(())
        }

        fn post_build_up(&self, ctx: &mut ResolutionContext<'_>) -> Result<(), ResolveError> {
            assert!(ctx.existing().is_some());
            self.log.lock().push(format!("post {}", self.label));
            Ok(())
        }
    }

    #[test]
    fn test_chain_stops_at_completing_step() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let spy = |label| -> Arc<dyn BuildStep> {
            Arc::new(Spy {
                label,
                log: Arc::clone(&log),
            })
        };

        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<u8>())
                .chain(BuildChain::new(vec![
                    spy("first"),
                    spy("second"),
                    Arc::new(LifetimeStep),
                    Arc::new(MappingStep),
                    Arc::new(PlanStep),
                    spy("unreached"),
                ]))
                .factory(|_| Ok(Arc::new(1u8) as Instance))
                .build(),
        );

        container.resolve(&TypeKey::of::<u8>(), None).unwrap();
        assert_eq!(
            *log.lock(),
            vec!["pre first", "pre second", "post second", "post first"]
        );
    }

    #[test]
    fn test_empty_chain_fails() {
        let container = Container::new();
        container.register(
            Registration::builder(TypeKey::of::<u8>())
                .chain(BuildChain::default())
                .build(),
        );

        assert!(matches!(
            container.resolve(&TypeKey::of::<u8>(), None),
            Err(ResolveError::ResolutionFailed { .. })
        ));
    }
}
