//! IoC 构建器与模块测试

use crate::builder::IocBuilder;
use crate::module::{Module, ModuleRegistry};
use crate::LoggingConfig;
use di_abstractions::{implements, Injectable, Resolver, ResolverContext, ResolverExt, ServiceRegistration};
use di_impl::{ContainerConfig, DisposalPolicy, ServiceRegistrationImpl};
use ioc_common::{DependencyError, DependencyResult, InfrastructureError, Lifetime};
use std::io::Write;
use std::sync::Arc;

pub(super) trait IStorage: Send + Sync {
    fn location(&self) -> &str;
}

pub(super) struct FileStorage;

impl IStorage for FileStorage {
    fn location(&self) -> &str {
        "file"
    }
}

impl Injectable for FileStorage {
    fn inject(_ctx: &ResolverContext<'_>) -> Result<Self, DependencyError> {
        Ok(Self)
    }
}

implements!(FileStorage => dyn IStorage);

pub(super) trait ICache: Send + Sync {
    fn backend(&self) -> &str;
}

pub(super) struct StorageCache {
    storage: Arc<dyn IStorage>,
}

impl ICache for StorageCache {
    fn backend(&self) -> &str {
        self.storage.location()
    }
}

impl Injectable for StorageCache {
    fn inject(ctx: &ResolverContext<'_>) -> Result<Self, DependencyError> {
        Ok(Self {
            storage: ctx.resolve()?,
        })
    }
}

implements!(StorageCache => dyn ICache);

#[derive(Default)]
pub(super) struct StorageModule;

impl Module for StorageModule {
    fn register(&self, builder: IocBuilder) -> DependencyResult<IocBuilder> {
        builder.register_services(|r| {
            r.register::<dyn IStorage, FileStorage>(Lifetime::Singleton, false)?;
            Ok(())
        })
    }
}

/// 依赖其他模块的模块
#[derive(Default)]
struct CacheModule;

impl Module for CacheModule {
    fn register(&self, builder: IocBuilder) -> DependencyResult<IocBuilder> {
        builder.register_module::<StorageModule>()?.register_services(|r| {
            r.register::<dyn ICache, StorageCache>(Lifetime::LifetimeScope, false)?;
            Ok(())
        })
    }
}

/// 在自己的注册过程中再次注册自己
#[derive(Default)]
struct RecursiveModule;

impl Module for RecursiveModule {
    fn register(&self, builder: IocBuilder) -> DependencyResult<IocBuilder> {
        builder.register_module::<RecursiveModule>()
    }
}

#[test]
fn test_register_services_and_build() {
    let root = IocBuilder::new()
        .register_services(|r| {
            r.register::<dyn IStorage, FileStorage>(Lifetime::Transient, false)?;
            Ok(())
        })
        .unwrap()
        .create_resolver()
        .unwrap();

    assert_eq!(root.resolve::<dyn IStorage>().unwrap().location(), "file");
}

#[test]
fn test_modules_register_their_services() {
    let root = IocBuilder::new()
        .register_module::<CacheModule>()
        .unwrap()
        .create_resolver()
        .unwrap();

    assert_eq!(root.resolve::<dyn ICache>().unwrap().backend(), "file");
    assert!(root.is_registered::<dyn IStorage>());
}

#[test]
fn test_duplicate_module_fails() {
    let error = IocBuilder::new()
        .register_module::<StorageModule>()
        .unwrap()
        .register_module::<CacheModule>()
        .unwrap_err();

    assert!(matches!(error, DependencyError::DuplicateModule { .. }));
}

#[test]
fn test_module_registering_itself_fails() {
    let error = IocBuilder::new().register_module::<RecursiveModule>().unwrap_err();
    assert!(matches!(error, DependencyError::DuplicateModule { .. }));
}

#[test]
fn test_module_registry_is_recorded() {
    let builder = IocBuilder::new().register_module::<CacheModule>().unwrap();

    assert!(builder.modules().contains::<CacheModule>());
    assert!(builder.modules().contains::<StorageModule>());
    assert_eq!(builder.modules().len(), 2);
}

#[test]
fn test_use_service_registration_before_use() {
    let mut registration = ServiceRegistrationImpl::new();
    registration
        .register::<dyn IStorage, FileStorage>(Lifetime::Singleton, false)
        .unwrap();

    let root = IocBuilder::new()
        .use_service_registration(registration)
        .unwrap()
        .create_resolver()
        .unwrap();

    assert!(root.is_registered::<dyn IStorage>());
}

#[test]
fn test_use_service_registration_keeps_builder_config() {
    let config = ContainerConfig::default()
        .with_max_resolution_depth(8)
        .with_disposal_policy(DisposalPolicy::AbortOnError);

    let root = IocBuilder::new()
        .with_config(config)
        .use_service_registration(ServiceRegistrationImpl::new())
        .unwrap()
        .create_resolver()
        .unwrap();

    assert_eq!(root.disposal_policy(), DisposalPolicy::AbortOnError);
    assert_eq!(root.container().config().max_resolution_depth, 8);
}

#[test]
fn test_use_service_registration_after_use_fails() {
    let error = IocBuilder::new()
        .register_services(|r| {
            r.register_type::<FileStorage>(Lifetime::Transient, false)?;
            Ok(())
        })
        .unwrap()
        .use_service_registration(ServiceRegistrationImpl::new())
        .unwrap_err();

    assert!(matches!(error, DependencyError::RegistrationError { .. }));
}

#[test]
fn test_failing_registration_callback_propagates() {
    let error = IocBuilder::new()
        .register_services(|_r| Err(DependencyError::registration("FileStorage", "拒绝注册")))
        .unwrap_err();

    assert!(matches!(error, DependencyError::RegistrationError { .. }));
}

#[test]
fn test_config_file_is_applied() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "max_resolution_depth = 8").unwrap();
    writeln!(file, "disposal_policy = \"abort_on_error\"").unwrap();

    let root = IocBuilder::new()
        .with_config_file(file.path())
        .unwrap()
        .create_resolver()
        .unwrap();

    assert_eq!(root.disposal_policy(), DisposalPolicy::AbortOnError);
    assert_eq!(root.container().config().max_resolution_depth, 8);
}

#[test]
fn test_missing_config_file_fails() {
    let error = IocBuilder::new()
        .with_config_file("/nonexistent/ioc.toml")
        .unwrap_err();

    assert!(matches!(error, InfrastructureError::ConfigError { .. }));
}

#[test]
fn test_invalid_config_fails_build() {
    let error = IocBuilder::new()
        .with_config(ContainerConfig::default().with_max_resolution_depth(0))
        .create_resolver()
        .unwrap_err();

    assert!(matches!(error, InfrastructureError::ConfigError { .. }));
}

#[test]
fn test_with_logging_builds() {
    let root = IocBuilder::new()
        .with_logging(LoggingConfig::default().with_filter("warn"))
        .create_resolver()
        .unwrap();

    assert!(root.registered_services().is_empty());
    assert!(root.is_registered::<ModuleRegistry>());
}
