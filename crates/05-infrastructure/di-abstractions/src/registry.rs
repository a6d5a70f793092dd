//! 组件注册描述
//!
//! [`ComponentRegistration`] 描述一个组件：实现类型、生命周期、对外暴露的服务、
//! 激活器以及可选的启动回调。描述在注册阶段构建，容器构建后不再改变。

use crate::component::{
    downcast_instance, into_any, AnyInstance, Implements, Injectable, Service, Startable,
};
use crate::resolver::ResolverContext;
use ioc_common::{BoxError, DependencyError, DependencyResult, Lifetime, TypeInfo};
use std::marker::PhantomData;
use std::sync::Arc;

/// 实例释放回调，由拥有该实例的作用域调用一次
pub type Releaser = Box<dyn FnOnce() + Send>;

/// 激活结果
pub struct Activated {
    pub instance: AnyInstance,
    /// 需要作用域跟踪释放时存在
    pub releaser: Option<Releaser>,
}

/// 组件激活器
pub type ActivatorFn =
    Arc<dyn Fn(&ResolverContext<'_>) -> DependencyResult<Activated> + Send + Sync>;

/// 组件实例到服务实例的转换
pub type UpcastFn = Arc<dyn Fn(&AnyInstance) -> DependencyResult<AnyInstance> + Send + Sync>;

/// 启动回调
pub type StartFn = Arc<dyn Fn(&AnyInstance) -> Result<(), BoxError> + Send + Sync>;

/// 服务绑定
#[derive(Clone)]
pub struct ServiceBinding {
    pub service: TypeInfo,
    upcast: UpcastFn,
}

impl ServiceBinding {
    /// 实现类型作为服务暴露自身
    fn identity(service: TypeInfo) -> Self {
        Self {
            service,
            upcast: Arc::new(|instance: &AnyInstance| -> DependencyResult<AnyInstance> {
                Ok(instance.clone())
            }),
        }
    }

    /// 实现类型 `I` 作为服务 `S` 暴露
    fn of<S, I>() -> Self
    where
        S: ?Sized + Service,
        I: Implements<S>,
    {
        Self {
            service: TypeInfo::of::<S>(),
            upcast: Arc::new(|instance: &AnyInstance| -> DependencyResult<AnyInstance> {
                let concrete = downcast_instance::<I>(instance)?;
                Ok(into_any(<I as Implements<S>>::upcast(concrete)))
            }),
        }
    }
}

/// 组件注册信息
#[derive(Clone)]
pub struct ComponentRegistration {
    implementation: TypeInfo,
    lifetime: Lifetime,
    services: Vec<ServiceBinding>,
    activator: ActivatorFn,
    start: Option<StartFn>,
    internal: bool,
}

impl ComponentRegistration {
    /// 以可注入组件 `I` 开始构建注册信息
    pub fn of<I: Injectable>(lifetime: Lifetime) -> ComponentRegistrationBuilder<I> {
        ComponentRegistrationBuilder::new(lifetime)
    }

    /// 由工厂函数创建服务 `S` 的注册信息
    ///
    /// 工厂产出的实例由外部拥有，作用域释放时不会调用释放回调。
    pub fn factory<S, F>(factory: F, lifetime: Lifetime) -> Self
    where
        S: ?Sized + Service,
        F: Fn(&ResolverContext<'_>) -> DependencyResult<Arc<S>> + Send + Sync + 'static,
    {
        let service = TypeInfo::of::<S>();
        Self {
            implementation: service,
            lifetime,
            services: vec![ServiceBinding::identity(service)],
            activator: Arc::new(move |ctx: &ResolverContext<'_>| -> DependencyResult<Activated> {
                Ok(Activated {
                    instance: into_any(factory(ctx)?),
                    releaser: None,
                })
            }),
            start: None,
            internal: false,
        }
    }

    /// 由预先构建的实例创建单例注册信息
    pub fn instance<S: ?Sized + Service>(instance: Arc<S>) -> Self {
        let instance = into_any(instance);
        let service = TypeInfo::of::<S>();
        Self {
            implementation: service,
            lifetime: Lifetime::Singleton,
            services: vec![ServiceBinding::identity(service)],
            activator: Arc::new(move |_: &ResolverContext<'_>| -> DependencyResult<Activated> {
                Ok(Activated {
                    instance: instance.clone(),
                    releaser: None,
                })
            }),
            start: None,
            internal: false,
        }
    }

    /// 标记为框架内部注册，不出现在已注册服务列表中
    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    pub fn implementation(&self) -> TypeInfo {
        self.implementation
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }

    pub fn is_startable(&self) -> bool {
        self.start.is_some()
    }

    /// 暴露的服务类型，按声明顺序
    pub fn services(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.services.iter().map(|binding| binding.service)
    }

    /// 是否暴露指定服务
    pub fn exposes(&self, service: &TypeInfo) -> bool {
        self.services.iter().any(|binding| binding.service == *service)
    }

    /// 只保留满足条件的服务
    pub fn retain_services(mut self, keep: impl Fn(&TypeInfo) -> bool) -> Self {
        self.services.retain(|binding| keep(&binding.service));
        self
    }

    /// 创建组件实例
    pub fn activate(&self, ctx: &ResolverContext<'_>) -> DependencyResult<Activated> {
        (self.activator)(ctx)
    }

    /// 将组件实例转换为服务实例
    pub fn adapt(&self, service: &TypeInfo, component: &AnyInstance) -> DependencyResult<AnyInstance> {
        if *service == self.implementation {
            return Ok(component.clone());
        }
        let binding = self
            .services
            .iter()
            .find(|binding| binding.service == *service)
            .ok_or_else(|| {
                DependencyError::resolution_failed(
                    service.full_name,
                    format!("组件 {} 未暴露该服务", self.implementation.short_name()),
                )
            })?;
        (binding.upcast)(component)
    }

    /// 启动组件实例，非可启动组件直接返回
    pub fn start(&self, component: &AnyInstance) -> Result<(), BoxError> {
        match &self.start {
            Some(start) => start(component),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ComponentRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistration")
            .field("implementation", &self.implementation.full_name)
            .field("lifetime", &self.lifetime)
            .field(
                "services",
                &self.services().map(|s| s.full_name).collect::<Vec<_>>(),
            )
            .field("startable", &self.is_startable())
            .field("internal", &self.internal)
            .field("activator", &"<function>")
            .finish()
    }
}

/// 组件注册信息构建器
pub struct ComponentRegistrationBuilder<I> {
    lifetime: Lifetime,
    services: Vec<ServiceBinding>,
    start: Option<StartFn>,
    _implementation: PhantomData<fn() -> I>,
}

impl<I: Injectable> ComponentRegistrationBuilder<I> {
    fn new(lifetime: Lifetime) -> Self {
        Self {
            lifetime,
            services: Vec::new(),
            start: None,
            _implementation: PhantomData,
        }
    }

    /// 以服务 `S` 暴露
    pub fn as_service<S>(mut self) -> Self
    where
        S: ?Sized + Service,
        I: Implements<S>,
    {
        let service = TypeInfo::of::<S>();
        if !self.services.iter().any(|binding| binding.service == service) {
            self.services.push(ServiceBinding::of::<S, I>());
        }
        self
    }

    /// 以实现类型自身暴露
    pub fn as_self(self) -> Self {
        self.as_service::<I>()
    }

    /// 构建完成后启动
    pub fn startable(mut self) -> Self
    where
        I: Startable,
    {
        self.start = Some(Arc::new(|instance: &AnyInstance| -> Result<(), BoxError> {
            let component = downcast_instance::<I>(instance)?;
            component.start()
        }));
        self
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn build(self) -> ComponentRegistration {
        let services = if self.services.is_empty() {
            vec![ServiceBinding::identity(TypeInfo::of::<I>())]
        } else {
            self.services
        };
        ComponentRegistration {
            implementation: TypeInfo::of::<I>(),
            lifetime: self.lifetime,
            services,
            activator: Arc::new(|ctx: &ResolverContext<'_>| -> DependencyResult<Activated> {
                let instance = Arc::new(I::inject(ctx)?);
                let releaser: Option<Releaser> = if I::NEEDS_RELEASE {
                    let tracked = instance.clone();
                    Some(Box::new(move || tracked.release()))
                } else {
                    None
                };
                Ok(Activated {
                    instance: into_any(instance),
                    releaser,
                })
            }),
            start: self.start,
            internal: false,
        }
    }
}

impl<I: Injectable> From<ComponentRegistrationBuilder<I>> for ComponentRegistration {
    fn from(builder: ComponentRegistrationBuilder<I>) -> Self {
        builder.build()
    }
}
