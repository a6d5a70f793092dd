//! IoC 构建器

use crate::logging::LoggingConfig;
use crate::module::{Module, ModuleRegistry};
use di_abstractions::{ComponentRegistration, ServiceRegistration};
use di_impl::{ContainerConfig, RootScope, ServiceRegistrationImpl};
use ioc_common::{DependencyError, DependencyResult, InfrastructureResult};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// IoC 构建器
///
/// 累积服务注册和模块，最终构建出根解析器。
pub struct IocBuilder {
    /// 当前使用的服务注册门面
    registration: ServiceRegistrationImpl,
    /// 当前注册门面是否已经添加过注册
    registration_used: bool,
    /// 已注册的模块
    modules: ModuleRegistry,
    /// 通过 `with_config` 指定的容器配置，替换注册门面时沿用
    container_config: Option<ContainerConfig>,
    /// 日志配置，未设置时不初始化日志
    logging_config: Option<LoggingConfig>,
}

impl IocBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            registration: ServiceRegistrationImpl::new(),
            registration_used: false,
            modules: ModuleRegistry::new(),
            container_config: None,
            logging_config: None,
        }
    }

    /// 使用指定的服务注册门面
    ///
    /// 当前门面已经添加过注册时返回 `RegistrationError`。
    /// 之前通过 `with_config` 指定的配置会应用到新的门面上。
    pub fn use_service_registration(mut self, mut registration: ServiceRegistrationImpl) -> DependencyResult<Self> {
        if self.registration_used {
            return Err(DependencyError::registration(
                "IocBuilder",
                "当前服务注册已被使用，无法替换",
            ));
        }
        debug!("替换服务注册门面");
        if let Some(config) = &self.container_config {
            registration.set_config(config.clone());
        }
        self.registration = registration;
        Ok(self)
    }

    /// 通过回调添加服务注册
    pub fn register_services<F>(mut self, register: F) -> DependencyResult<Self>
    where
        F: FnOnce(&mut ServiceRegistrationImpl) -> DependencyResult<()>,
    {
        register(&mut self.registration)?;
        self.registration_used = true;
        Ok(self)
    }

    /// 注册模块
    pub fn register_module<M: Module + Default>(self) -> DependencyResult<Self> {
        self.register_module_instance(M::default())
    }

    /// 注册模块实例，同一模块类型只能注册一次
    pub fn register_module_instance<M: Module>(mut self, module: M) -> DependencyResult<Self> {
        let module = Arc::new(module);
        self.modules.add(module.clone())?;
        info!("注册模块: {}", module.name());
        module.register(self)
    }

    /// 设置容器配置
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.registration.set_config(config.clone());
        self.container_config = Some(config);
        self
    }

    /// 从配置文件加载容器配置，并叠加 `IOC_` 前缀的环境变量
    pub fn with_config_file<P: AsRef<Path>>(self, path: P) -> InfrastructureResult<Self> {
        let config = ContainerConfig::load(path)?;
        Ok(self.with_config(config))
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self
    }

    /// 已注册的模块
    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    pub fn registration(&self) -> &ServiceRegistrationImpl {
        &self.registration
    }

    /// 构建根解析器
    pub fn create_resolver(self) -> InfrastructureResult<Arc<RootScope>> {
        self.build(true)
    }

    /// 构建根解析器，不启动可启动组件
    pub fn create_resolver_ignoring_startables(self) -> InfrastructureResult<Arc<RootScope>> {
        self.build(false)
    }

    fn build(self, start_components: bool) -> InfrastructureResult<Arc<RootScope>> {
        if let Some(logging_config) = &self.logging_config {
            logging_config.initialize();
        }

        self.registration.config().validate()?;

        info!("开始构建根解析器，模块 {} 个", self.modules.len());
        let mut registration = self.registration;
        registration.register_component(ComponentRegistration::instance(Arc::new(self.modules)).internal(), false)?;

        let root = if start_components {
            registration.create_resolver()?
        } else {
            registration.create_resolver_ignoring_startables()?
        };
        Ok(root)
    }
}

impl Default for IocBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IocBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IocBuilder")
            .field("registration", &self.registration)
            .field("registration_used", &self.registration_used)
            .field("modules", &self.modules)
            .field("container_config", &self.container_config)
            .finish()
    }
}

