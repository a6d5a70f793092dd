//! 服务注册门面实现

use crate::config::ContainerConfig;
use crate::container::{ComponentRegistry, Container};
use crate::decorator::DecoratorRegistry;
use crate::root::RootScope;
use di_abstractions::{
    Assembly, BeforeRegistrationCompletedEventArgs, BeforeRegistrationCompletedHandler,
    ComponentRegistration, Implements, Injectable, OnConventionalRegisteringEventArgs,
    OnConventionalRegisteringHandler, OnDisposingEventArgs, OnDisposingHandler, OnRegisteringEventArgs,
    OnRegisteringHandler, RegistrationCompletedEventArgs, RegistrationCompletedHandler, ResolverContext,
    Service, ServiceRegistration,
};
use ioc_common::{BoxError, DependencyError, DependencyResult, Lifetime, NamingConventions, TypeInfo};
use std::any::TypeId;
use std::sync::Arc;
use tracing::{debug, info};

/// 服务注册门面
///
/// `create_resolver` 消耗门面本身，一个门面只能构建一次。
pub struct ServiceRegistrationImpl {
    registry: ComponentRegistry,
    decorators: Arc<DecoratorRegistry>,
    config: ContainerConfig,
    registering_handlers: Vec<OnRegisteringHandler>,
    conventional_registering_handlers: Vec<OnConventionalRegisteringHandler>,
    before_completed_handlers: Vec<BeforeRegistrationCompletedHandler>,
    completed_handlers: Vec<RegistrationCompletedHandler>,
    disposing_handlers: Vec<OnDisposingHandler>,
}

impl ServiceRegistrationImpl {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            registry: ComponentRegistry::new(),
            decorators: Arc::new(DecoratorRegistry::new()),
            config,
            registering_handlers: Vec::new(),
            conventional_registering_handlers: Vec::new(),
            before_completed_handlers: Vec::new(),
            completed_handlers: Vec::new(),
            disposing_handlers: Vec::new(),
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 替换容器配置
    pub fn set_config(&mut self, config: ContainerConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// 已添加的注册数量
    pub fn registration_count(&self) -> usize {
        self.registry.len()
    }

    pub fn decorators(&self) -> &DecoratorRegistry {
        &self.decorators
    }

    fn add(&mut self, registration: ComponentRegistration, keep_default: bool) -> DependencyResult<()> {
        let args = OnRegisteringEventArgs {
            implementation: registration.implementation(),
            services: registration.services().collect(),
            lifetime: registration.lifetime(),
        };
        for handler in &self.registering_handlers {
            handler(&args).map_err(|e| lifecycle_error("注册事件", e))?;
        }
        self.registry.add(registration, keep_default);
        Ok(())
    }

    fn build(self, start_components: bool) -> DependencyResult<Arc<RootScope>> {
        let before_args = BeforeRegistrationCompletedEventArgs {
            registration_count: self.registry.len(),
        };
        for handler in &self.before_completed_handlers {
            handler(&before_args).map_err(|e| lifecycle_error("注册完成前事件", e))?;
        }

        let registration_count = self.registry.len();
        let ignore_startables = self.config.ignore_startable_components || !start_components;
        let container = Arc::new(Container::new(self.registry, self.decorators, self.config));
        let root = RootScope::new(container, self.disposing_handlers);

        if !ignore_startables {
            root.start_components()?;
        }

        let completed_args = RegistrationCompletedEventArgs { resolver: &*root };
        for handler in &self.completed_handlers {
            handler(&completed_args).map_err(|e| lifecycle_error("注册完成事件", e))?;
        }

        info!("根解析器构建完成，共 {} 个注册", registration_count);
        Ok(root)
    }
}

impl Default for ServiceRegistrationImpl {
    fn default() -> Self {
        Self::new()
    }
}

fn lifecycle_error(event: &str, source: BoxError) -> DependencyError {
    DependencyError::LifecycleError {
        message: format!("{}处理失败: {}", event, source),
    }
}

impl ServiceRegistration for ServiceRegistrationImpl {
    type Root = RootScope;

    fn register<S, I>(&mut self, lifetime: Lifetime, keep_default: bool) -> DependencyResult<&mut Self>
    where
        S: ?Sized + Service,
        I: Injectable + Implements<S>,
    {
        let registration = ComponentRegistration::of::<I>(lifetime)
            .as_self()
            .as_service::<S>()
            .build();
        self.add(registration, keep_default)?;
        Ok(self)
    }

    fn register_type<I: Injectable>(&mut self, lifetime: Lifetime, keep_default: bool) -> DependencyResult<&mut Self> {
        self.add(ComponentRegistration::of::<I>(lifetime).as_self().build(), keep_default)?;
        Ok(self)
    }

    fn register_factory<S, F>(
        &mut self,
        factory: F,
        lifetime: Lifetime,
        keep_default: bool,
    ) -> DependencyResult<&mut Self>
    where
        S: ?Sized + Service,
        F: Fn(&ResolverContext<'_>) -> DependencyResult<Arc<S>> + Send + Sync + 'static,
    {
        self.add(ComponentRegistration::factory::<S, F>(factory, lifetime), keep_default)?;
        Ok(self)
    }

    fn register_instance<S: ?Sized + Service>(
        &mut self,
        instance: Arc<S>,
        keep_default: bool,
    ) -> DependencyResult<&mut Self> {
        self.add(ComponentRegistration::instance(instance), keep_default)?;
        Ok(self)
    }

    fn register_component(
        &mut self,
        registration: impl Into<ComponentRegistration>,
        keep_default: bool,
    ) -> DependencyResult<&mut Self> {
        self.add(registration.into(), keep_default)?;
        Ok(self)
    }

    fn register_if_absent<S, I>(&mut self, lifetime: Lifetime) -> DependencyResult<&mut Self>
    where
        S: ?Sized + Service,
        I: Injectable + Implements<S>,
    {
        if self.registry.is_registered(TypeId::of::<S>()) {
            debug!("服务已注册，跳过: {}", TypeInfo::of::<S>().short_name());
            return Ok(self);
        }
        self.register::<S, I>(lifetime, false)
    }

    fn register_type_if_absent<I: Injectable>(&mut self, lifetime: Lifetime) -> DependencyResult<&mut Self> {
        if self.registry.is_registered(TypeId::of::<I>()) {
            debug!("组件已注册，跳过: {}", TypeInfo::of::<I>().short_name());
            return Ok(self);
        }
        self.register_type::<I>(lifetime, false)
    }

    fn decorate<S, F>(&mut self, decorator: F) -> &mut Self
    where
        S: ?Sized + Service,
        F: Fn(&ResolverContext<'_>, Arc<S>) -> DependencyResult<Arc<S>> + Send + Sync + 'static,
    {
        self.decorators.add_decorator::<S, F>(decorator);
        self
    }

    fn register_assembly_by_convention(&mut self, assembly: &Assembly) -> DependencyResult<&mut Self> {
        let args = OnConventionalRegisteringEventArgs {
            assembly: assembly.name().to_string(),
            component_count: assembly.len(),
        };
        for handler in &self.conventional_registering_handlers {
            handler(&args).map_err(|e| lifecycle_error("约定注册事件", e))?;
        }

        for component in assembly.components() {
            let implementation = component.implementation();
            let defaults =
                NamingConventions::default_interfaces(&implementation, &component.declared_services());
            debug!(
                "约定注册: {} ({}) -> {:?}",
                implementation.short_name(),
                component.lifetime(),
                defaults.iter().map(TypeInfo::short_name).collect::<Vec<_>>()
            );
            let registration = component
                .registration()
                .clone()
                .retain_services(|service| *service == implementation || defaults.contains(service));
            self.add(registration, false)?;
        }

        info!("约定注册完成: {}，{} 个组件", assembly.name(), assembly.len());
        Ok(self)
    }

    fn is_registered<S: ?Sized + 'static>(&self) -> bool {
        self.registry.is_registered(TypeId::of::<S>())
    }

    fn on_registering(
        &mut self,
        handler: impl Fn(&OnRegisteringEventArgs) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.registering_handlers.push(Arc::new(handler));
        self
    }

    fn on_conventional_registering(
        &mut self,
        handler: impl Fn(&OnConventionalRegisteringEventArgs) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.conventional_registering_handlers.push(Arc::new(handler));
        self
    }

    fn before_registration_completed(
        &mut self,
        handler: impl Fn(&BeforeRegistrationCompletedEventArgs) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.before_completed_handlers.push(Arc::new(handler));
        self
    }

    fn registration_completed(
        &mut self,
        handler: impl Fn(&RegistrationCompletedEventArgs<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.completed_handlers.push(Arc::new(handler));
        self
    }

    fn on_disposing(
        &mut self,
        handler: impl Fn(&OnDisposingEventArgs<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.disposing_handlers.push(Arc::new(handler));
        self
    }

    fn create_resolver(self) -> DependencyResult<Arc<RootScope>> {
        self.build(true)
    }

    fn create_resolver_ignoring_startables(self) -> DependencyResult<Arc<RootScope>> {
        self.build(false)
    }
}

impl std::fmt::Debug for ServiceRegistrationImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistrationImpl")
            .field("registry", &self.registry)
            .field("decorators", &self.decorators)
            .field("config", &self.config)
            .finish()
    }
}
