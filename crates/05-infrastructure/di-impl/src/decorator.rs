//! 装饰器注册表
//!
//! 每个服务类型对应一个有序的装饰器列表。解析时按注册顺序依次包装实例：
//! 第一个注册的装饰器在最内层，最后一个在最外层，即 `d_n(...d_1(instance)...)`。

use dashmap::DashMap;
use di_abstractions::{downcast_instance, into_any, AnyInstance, ResolverContext, Service};
use ioc_common::{DependencyResult, TypeInfo};
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 类型擦除后的装饰器
type ErasedDecorator =
    Arc<dyn Fn(&ResolverContext<'_>, AnyInstance) -> DependencyResult<AnyInstance> + Send + Sync>;

/// 装饰器注册表
#[derive(Default)]
pub struct DecoratorRegistry {
    /// 按服务类型分组的装饰器，保持注册顺序
    decorators: RwLock<HashMap<TypeId, Vec<ErasedDecorator>>>,
    /// 运行时类型分发缓存：服务类型 -> 装饰器链快照
    dispatchers: DashMap<TypeId, Arc<[ErasedDecorator]>>,
}

impl DecoratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为服务 `S` 追加装饰器
    pub fn add_decorator<S, F>(&self, decorator: F)
    where
        S: ?Sized + Service,
        F: Fn(&ResolverContext<'_>, Arc<S>) -> DependencyResult<Arc<S>> + Send + Sync + 'static,
    {
        let erased: ErasedDecorator = Arc::new(
            move |ctx: &ResolverContext<'_>, instance: AnyInstance| -> DependencyResult<AnyInstance> {
                let typed = downcast_instance::<S>(&instance)?;
                Ok(into_any(decorator(ctx, typed)?))
            },
        );

        let service = TypeInfo::of::<S>();
        let count = {
            // 持有写锁直到快照失效，避免并发的 dispatcher 写回旧快照
            let mut decorators = self.decorators.write();
            let chain = decorators.entry(service.id).or_default();
            chain.push(erased);
            let count = chain.len();
            self.dispatchers.remove(&service.id);
            count
        };
        debug!("添加装饰器: {} (第 {} 个)", service.short_name(), count);
    }

    /// 用服务 `S` 的全部装饰器包装实例，没有装饰器时原样返回
    pub fn decorate<S: ?Sized + Service>(
        &self,
        instance: Arc<S>,
        ctx: &ResolverContext<'_>,
    ) -> DependencyResult<Arc<S>> {
        let decorated = self.decorate_dyn(TypeInfo::of::<S>(), into_any(instance), ctx)?;
        downcast_instance::<S>(&decorated)
    }

    /// 运行时类型的装饰入口，实例内部必须是 `Arc<S>`
    pub fn decorate_dyn(
        &self,
        service: TypeInfo,
        instance: AnyInstance,
        ctx: &ResolverContext<'_>,
    ) -> DependencyResult<AnyInstance> {
        self.dispatcher(service.id)
            .iter()
            .try_fold(instance, |current, decorator| decorator(ctx, current))
    }

    /// 服务是否有装饰器
    pub fn has_decorators(&self, service: TypeId) -> bool {
        self.decorator_count(service) > 0
    }

    pub fn decorator_count(&self, service: TypeId) -> usize {
        self.decorators.read().get(&service).map_or(0, Vec::len)
    }

    /// 获取装饰器链快照
    ///
    /// 并发首次访问可能各自计算快照，写入的总是完整的快照，先写入者生效。
    fn dispatcher(&self, service: TypeId) -> Arc<[ErasedDecorator]> {
        if let Some(dispatcher) = self.dispatchers.get(&service) {
            return dispatcher.clone();
        }

        let decorators = self.decorators.read();
        let snapshot: Arc<[ErasedDecorator]> = match decorators.get(&service) {
            Some(chain) => chain.as_slice().into(),
            None => Arc::from(Vec::new()),
        };
        self.dispatchers.entry(service).or_insert(snapshot).clone()
    }
}

impl std::fmt::Debug for DecoratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoratorRegistry")
            .field("services", &self.decorators.read().len())
            .field("dispatchers", &self.dispatchers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::{Arguments, ResolutionChain, ResolveRequest, Resolver};
    use ioc_common::DependencyError;
    use std::sync::Barrier;

    trait IMessage: Send + Sync {
        fn text(&self) -> String;
    }

    struct Plain;

    impl IMessage for Plain {
        fn text(&self) -> String {
            "plain".to_string()
        }
    }

    struct Wrapped {
        label: &'static str,
        inner: Arc<dyn IMessage>,
    }

    impl IMessage for Wrapped {
        fn text(&self) -> String {
            format!("{}({})", self.label, self.inner.text())
        }
    }

    fn wrap(label: &'static str) -> impl Fn(&ResolverContext<'_>, Arc<dyn IMessage>) -> DependencyResult<Arc<dyn IMessage>> {
        move |_ctx, inner| Ok(Arc::new(Wrapped { label, inner }) as Arc<dyn IMessage>)
    }

    struct NoopResolver;

    impl Resolver for NoopResolver {
        fn resolve_service(&self, request: ResolveRequest<'_>) -> DependencyResult<AnyInstance> {
            Err(DependencyError::not_registered(request.service.full_name))
        }

        fn resolve_all_services(&self, _request: ResolveRequest<'_>) -> DependencyResult<Vec<AnyInstance>> {
            Ok(Vec::new())
        }

        fn registered_services(&self) -> Vec<TypeInfo> {
            Vec::new()
        }

        fn is_registered_by_type_id(&self, _type_id: TypeId) -> bool {
            false
        }
    }

    fn with_context<R>(f: impl FnOnce(&ResolverContext<'_>) -> R) -> R {
        let chain = ResolutionChain::default();
        let ctx = ResolverContext::new(&NoopResolver, Arguments::empty(), &chain);
        f(&ctx)
    }

    #[test]
    fn test_last_added_decorator_is_outermost() {
        let registry = DecoratorRegistry::new();
        registry.add_decorator::<dyn IMessage, _>(wrap("d1"));
        registry.add_decorator::<dyn IMessage, _>(wrap("d2"));

        let decorated = with_context(|ctx| registry.decorate::<dyn IMessage>(Arc::new(Plain), ctx)).unwrap();

        assert_eq!(decorated.text(), "d2(d1(plain))");
    }

    #[test]
    fn test_no_decorators_returns_same_instance() {
        let registry = DecoratorRegistry::new();
        let instance: Arc<dyn IMessage> = Arc::new(Plain);

        let decorated = with_context(|ctx| registry.decorate(instance.clone(), ctx)).unwrap();

        assert!(Arc::ptr_eq(&instance, &decorated));
        assert!(!registry.has_decorators(TypeId::of::<dyn IMessage>()));
    }

    #[test]
    fn test_generic_and_runtime_decoration_are_equivalent() {
        let registry = DecoratorRegistry::new();
        registry.add_decorator::<dyn IMessage, _>(wrap("d1"));
        registry.add_decorator::<dyn IMessage, _>(wrap("d2"));

        let (generic, dynamic) = with_context(|ctx| {
            let generic = registry.decorate::<dyn IMessage>(Arc::new(Plain), ctx).unwrap();
            let erased = registry
                .decorate_dyn(TypeInfo::of::<dyn IMessage>(), into_any::<dyn IMessage>(Arc::new(Plain)), ctx)
                .unwrap();
            (generic, downcast_instance::<dyn IMessage>(&erased).unwrap())
        });

        assert_eq!(generic.text(), dynamic.text());
    }

    #[test]
    fn test_adding_decorator_invalidates_dispatcher() {
        let registry = DecoratorRegistry::new();
        registry.add_decorator::<dyn IMessage, _>(wrap("d1"));

        let first = with_context(|ctx| registry.decorate::<dyn IMessage>(Arc::new(Plain), ctx)).unwrap();
        registry.add_decorator::<dyn IMessage, _>(wrap("d2"));
        let second = with_context(|ctx| registry.decorate::<dyn IMessage>(Arc::new(Plain), ctx)).unwrap();

        assert_eq!(first.text(), "d1(plain)");
        assert_eq!(second.text(), "d2(d1(plain))");
    }

    #[test]
    fn test_decorator_error_propagates() {
        let registry = DecoratorRegistry::new();
        registry.add_decorator::<dyn IMessage, _>(|ctx: &ResolverContext<'_>, _inner: Arc<dyn IMessage>| {
            ctx.resolve::<dyn IMessage>()
        });

        let error = with_context(|ctx| registry.decorate::<dyn IMessage>(Arc::new(Plain), ctx))
            .err()
            .unwrap();

        assert!(error.is_not_registered());
    }

    #[test]
    fn test_concurrent_first_use_builds_complete_dispatcher() {
        let registry = Arc::new(DecoratorRegistry::new());
        registry.add_decorator::<dyn IMessage, _>(wrap("d1"));
        registry.add_decorator::<dyn IMessage, _>(wrap("d2"));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    with_context(|ctx| {
                        registry
                            .decorate_dyn(
                                TypeInfo::of::<dyn IMessage>(),
                                into_any::<dyn IMessage>(Arc::new(Plain)),
                                ctx,
                            )
                            .and_then(|erased| downcast_instance::<dyn IMessage>(&erased))
                            .map(|message| message.text())
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), "d2(d1(plain))");
        }
    }

    #[test]
    fn test_dispatch_during_registration_never_keeps_stale_chain() {
        let registry = Arc::new(DecoratorRegistry::new());
        let adding = Arc::new(std::sync::atomic::AtomicBool::new(true));
        let barrier = Arc::new(Barrier::new(5));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                let adding = adding.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    while adding.load(std::sync::atomic::Ordering::Acquire) {
                        with_context(|ctx| registry.decorate::<dyn IMessage>(Arc::new(Plain), ctx)).unwrap();
                    }
                })
            })
            .collect();

        barrier.wait();
        for _ in 0..50 {
            registry.add_decorator::<dyn IMessage, _>(wrap("d"));
        }
        adding.store(false, std::sync::atomic::Ordering::Release);
        for reader in readers {
            reader.join().unwrap();
        }

        let decorated = with_context(|ctx| registry.decorate::<dyn IMessage>(Arc::new(Plain), ctx)).unwrap();
        assert_eq!(decorated.text().matches("d(").count(), 50);
    }
}
