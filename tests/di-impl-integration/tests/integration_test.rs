//! 依赖注入端到端集成测试

use di_abstractions::{
    implements, Injectable, OnDisposingEventArgs, ResolverContext, ResolverExt, RootResolver,
    ServiceRegistration,
};
use di_impl_integration_tests::EventLog;
use ioc_common::{BoxError, DependencyError, DependencyResult, Lifetime};
use ioc_composition::{IocBuilder, IocManager, Module, UseIocManager};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait IOrderRepository: Send + Sync {
    fn save(&self, order: &str) -> usize;
}

trait IOrderHandler: Send + Sync {
    fn handle(&self, order: &str) -> String;
}

/// 单例仓储，统计保存次数
struct MemoryOrderRepository {
    saved: AtomicUsize,
}

impl IOrderRepository for MemoryOrderRepository {
    fn save(&self, _order: &str) -> usize {
        self.saved.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Injectable for MemoryOrderRepository {
    fn inject(_ctx: &ResolverContext<'_>) -> Result<Self, DependencyError> {
        Ok(Self {
            saved: AtomicUsize::new(0),
        })
    }
}

implements!(MemoryOrderRepository => dyn IOrderRepository);

/// 每个请求作用域一个工作单元
struct UnitOfWork {
    log: Arc<EventLog>,
    id: usize,
}

static UNIT_IDS: AtomicUsize = AtomicUsize::new(0);

impl Injectable for UnitOfWork {
    const NEEDS_RELEASE: bool = true;

    fn inject(ctx: &ResolverContext<'_>) -> Result<Self, DependencyError> {
        Ok(Self {
            log: ctx.resolve()?,
            id: UNIT_IDS.fetch_add(1, Ordering::SeqCst),
        })
    }

    fn release(&self) {
        self.log.record("release:uow");
    }
}

struct PlaceOrderHandler {
    repository: Arc<dyn IOrderRepository>,
    unit_of_work: Arc<UnitOfWork>,
    log: Arc<EventLog>,
}

impl IOrderHandler for PlaceOrderHandler {
    fn handle(&self, order: &str) -> String {
        let saved = self.repository.save(order);
        format!("{}#{}@{}", order, saved, self.unit_of_work.id)
    }
}

impl Injectable for PlaceOrderHandler {
    const NEEDS_RELEASE: bool = true;

    fn inject(ctx: &ResolverContext<'_>) -> Result<Self, DependencyError> {
        Ok(Self {
            repository: ctx.resolve()?,
            unit_of_work: ctx.resolve()?,
            log: ctx.resolve()?,
        })
    }

    fn release(&self) {
        self.log.record("release:handler");
    }
}

implements!(PlaceOrderHandler => dyn IOrderHandler);

/// 记录调用的装饰器
struct TracingHandler {
    inner: Arc<dyn IOrderHandler>,
    log: Arc<EventLog>,
}

impl IOrderHandler for TracingHandler {
    fn handle(&self, order: &str) -> String {
        self.log.record(format!("handle:{}", order));
        self.inner.handle(order)
    }
}

#[derive(Default)]
struct OrderModule;

impl Module for OrderModule {
    fn register(&self, builder: IocBuilder) -> DependencyResult<IocBuilder> {
        builder.register_services(|r| {
            r.register::<dyn IOrderRepository, MemoryOrderRepository>(Lifetime::Singleton, false)?
                .register_type::<UnitOfWork>(Lifetime::LifetimeScope, false)?
                .register::<dyn IOrderHandler, PlaceOrderHandler>(Lifetime::Transient, false)?
                .decorate::<dyn IOrderHandler, _>(|ctx, inner| {
                    Ok(Arc::new(TracingHandler {
                        inner,
                        log: ctx.resolve()?,
                    }))
                });
            Ok(())
        })
    }
}

fn order_manager(log: &Arc<EventLog>) -> anyhow::Result<IocManager> {
    let registered = log.clone();
    let root = IocBuilder::new()
        .register_module::<OrderModule>()?
        .register_services(move |r| {
            r.register_instance::<EventLog>(registered, false)?;
            Ok(())
        })?
        .create_resolver()?;
    Ok(root.use_ioc_manager())
}

#[test]
fn test_request_scope_pipeline() -> anyhow::Result<()> {
    let log = Arc::new(EventLog::default());
    let manager = order_manager(&log)?;

    let receipt = manager.using_scope(|scope| -> DependencyResult<String> {
        let handler = scope.resolve::<dyn IOrderHandler>()?;
        let unit_of_work = scope.resolve::<UnitOfWork>()?;
        let receipt = handler.handle("book");
        assert!(receipt.ends_with(&format!("@{}", unit_of_work.id)));
        Ok(receipt)
    })??;

    assert!(receipt.starts_with("book#1@"));
    assert_eq!(log.entries(), vec!["handle:book", "release:handler", "release:uow"]);
    Ok(())
}

#[test]
fn test_requests_share_singleton_but_not_unit_of_work() -> anyhow::Result<()> {
    let log = Arc::new(EventLog::default());
    let manager = order_manager(&log)?;

    let first = manager.resolve_using::<dyn IOrderHandler, _>(|handler| handler.handle("a"))?;
    let second = manager.resolve_using::<dyn IOrderHandler, _>(|handler| handler.handle("b"))?;

    assert!(first.starts_with("a#1@"));
    assert!(second.starts_with("b#2@"));
    assert_ne!(first.rsplit('@').next(), second.rsplit('@').next());
    assert_eq!(log.count("release:uow"), 2);
    Ok(())
}

#[test]
fn test_root_disposal_notifies_runtime_subscribers_first() -> anyhow::Result<()> {
    let log = Arc::new(EventLog::default());
    let manager = order_manager(&log)?;
    manager.root().on_disposing(Arc::new(|args: &OnDisposingEventArgs<'_>| -> Result<(), BoxError> {
        args.resolver.resolve::<EventLog>()?.record("disposing");
        assert!(args.scope.is_root());
        Ok(())
    }));

    manager.resolve::<dyn IOrderHandler>()?.handle("root");
    manager.dispose()?;
    manager.dispose()?;

    assert_eq!(
        log.entries(),
        vec!["handle:root", "disposing", "release:handler", "release:uow"]
    );
    assert!(manager.create_scope().err().map_or(false, |e| e.is_disposed()));
    Ok(())
}

trait IService: Send + Sync {
    fn name(&self) -> &'static str;
}

struct ServiceA;
struct ServiceB;

impl IService for ServiceA {
    fn name(&self) -> &'static str {
        "A"
    }
}

impl IService for ServiceB {
    fn name(&self) -> &'static str {
        "B"
    }
}

impl Injectable for ServiceA {
    fn inject(_ctx: &ResolverContext<'_>) -> Result<Self, DependencyError> {
        Ok(Self)
    }
}

impl Injectable for ServiceB {
    fn inject(_ctx: &ResolverContext<'_>) -> Result<Self, DependencyError> {
        Ok(Self)
    }
}

implements!(ServiceA => dyn IService);
implements!(ServiceB => dyn IService);

#[test]
fn test_default_override_across_registration_calls() -> anyhow::Result<()> {
    let root = IocBuilder::new()
        .register_services(|r| {
            r.register::<dyn IService, ServiceA>(Lifetime::Transient, false)?;
            Ok(())
        })?
        .register_services(|r| {
            r.register::<dyn IService, ServiceB>(Lifetime::Transient, false)?
                .register_if_absent::<dyn IService, ServiceA>(Lifetime::Transient)?;
            Ok(())
        })?
        .create_resolver()?;

    assert_eq!(root.resolve::<dyn IService>()?.name(), "B");
    assert_eq!(root.resolve_all::<dyn IService>()?.len(), 2);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests() -> anyhow::Result<()> {
    let log = Arc::new(EventLog::default());
    let manager = order_manager(&log)?;

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let manager = manager.clone();
            tokio::spawn(async move {
                manager.resolve_using::<dyn IOrderHandler, _>(|handler| handler.handle(&format!("order-{}", i)))
            })
        })
        .collect();

    let mut receipts = Vec::new();
    for handle in handles {
        receipts.push(handle.await??);
    }

    let repository = manager.resolve::<dyn IOrderRepository>()?;
    assert_eq!(repository.save("final"), 13);
    assert_eq!(receipts.len(), 12);
    assert_eq!(log.count("release:uow"), 12);
    assert_eq!(log.count("release:handler"), 12);
    Ok(())
}
