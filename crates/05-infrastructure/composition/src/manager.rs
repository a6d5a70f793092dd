//! IoC 管理器
//!
//! [`IocManager`] 是持有根解析器的上下文对象，可以廉价克隆并在各处传递。
//! 需要进程级默认实例时，通过 [`bootstrap`] 显式安装，再由
//! [`IocManager::current`] 取回。

use crate::builder::IocBuilder;
use crate::module::{Module, ModuleRegistry};
use di_abstractions::{AnyInstance, IntoArguments, Resolver, ResolverExt, ScopeResolver, Service};
use di_impl::{DisposableObjectWrapper, RootScope};
use ioc_common::{DependencyError, DependencyResult, InfrastructureResult, TypeInfo};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{info, warn};

static CURRENT: OnceCell<IocManager> = OnceCell::new();

/// IoC 管理器
#[derive(Clone, Debug)]
pub struct IocManager {
    root: Arc<RootScope>,
}

impl IocManager {
    /// 包装已构建的根解析器
    pub fn new(root: Arc<RootScope>) -> Self {
        Self { root }
    }

    /// 进程默认的管理器
    pub fn current() -> DependencyResult<Self> {
        CURRENT.get().cloned().ok_or_else(|| {
            DependencyError::registration("IocManager", "尚未通过 bootstrap 安装默认管理器")
        })
    }

    /// 根解析器
    pub fn root(&self) -> &Arc<RootScope> {
        &self.root
    }

    pub fn resolve<S: ?Sized + Service>(&self) -> DependencyResult<Arc<S>> {
        self.root.resolve::<S>()
    }

    pub fn resolve_with<S: ?Sized + Service>(&self, arguments: impl IntoArguments) -> DependencyResult<Arc<S>> {
        self.root.resolve_with::<S>(arguments)
    }

    pub fn try_resolve<S: ?Sized + Service>(&self) -> DependencyResult<Option<Arc<S>>> {
        self.root.try_resolve::<S>()
    }

    pub fn resolve_all<S: ?Sized + Service>(&self) -> DependencyResult<Vec<Arc<S>>> {
        self.root.resolve_all::<S>()
    }

    pub fn resolve_all_with<S: ?Sized + Service>(
        &self,
        arguments: impl IntoArguments,
    ) -> DependencyResult<Vec<Arc<S>>> {
        self.root.resolve_all_with::<S>(arguments)
    }

    /// 按运行时类型解析服务
    pub fn resolve_by_type(&self, service: TypeInfo) -> DependencyResult<AnyInstance> {
        self.root.resolve_by_type(service)
    }

    pub fn resolve_by_type_with(
        &self,
        service: TypeInfo,
        arguments: impl IntoArguments,
    ) -> DependencyResult<AnyInstance> {
        self.root.resolve_by_type_with(service, arguments)
    }

    pub fn resolve_all_by_type(&self, service: TypeInfo) -> DependencyResult<Vec<AnyInstance>> {
        self.root.resolve_all_by_type(service)
    }

    pub fn is_registered<S: ?Sized + 'static>(&self) -> bool {
        self.root.is_registered::<S>()
    }

    pub fn is_registered_type(&self, service: TypeInfo) -> bool {
        self.root.is_registered_type(service)
    }

    pub fn registered_services(&self) -> Vec<TypeInfo> {
        self.root.registered_services()
    }

    /// 开启新的作用域，由调用方负责释放
    pub fn create_scope(&self) -> DependencyResult<Arc<dyn ScopeResolver>> {
        self.root.begin_scope()
    }

    /// 在独立作用域中解析对象，包装器释放时一并释放作用域
    pub fn resolve_as_disposable<S: ?Sized + Service>(&self) -> DependencyResult<DisposableObjectWrapper<S>> {
        DisposableObjectWrapper::new(&*self.root)
    }

    pub fn resolve_as_disposable_with<S: ?Sized + Service>(
        &self,
        arguments: impl IntoArguments,
    ) -> DependencyResult<DisposableObjectWrapper<S>> {
        DisposableObjectWrapper::with_arguments(&*self.root, arguments)
    }

    /// 在临时作用域中解析对象并执行回调，回调返回后释放作用域
    pub fn resolve_using<S, R>(&self, f: impl FnOnce(&S) -> R) -> DependencyResult<R>
    where
        S: ?Sized + Service,
    {
        let wrapper = self.resolve_as_disposable::<S>()?;
        let result = f(&*wrapper);
        wrapper.dispose()?;
        Ok(result)
    }

    /// 在临时作用域中执行回调，回调返回后释放作用域
    pub fn using_scope<R>(&self, f: impl FnOnce(&dyn ScopeResolver) -> R) -> DependencyResult<R> {
        let scope = self.create_scope()?;
        let result = f(&*scope);
        scope.dispose()?;
        Ok(result)
    }

    /// 已注册的模块
    pub fn modules(&self) -> DependencyResult<Arc<ModuleRegistry>> {
        self.root.resolve::<ModuleRegistry>()
    }

    pub fn get_module<M: Module>(&self) -> DependencyResult<Arc<M>> {
        self.modules()?.get_module::<M>()
    }

    pub fn try_get_module<M: Module>(&self) -> DependencyResult<Option<Arc<M>>> {
        Ok(self.modules()?.try_get_module::<M>())
    }

    pub fn is_disposed(&self) -> bool {
        self.root.is_disposed()
    }

    /// 释放根解析器
    pub fn dispose(&self) -> DependencyResult<()> {
        self.root.dispose()
    }
}

/// 构建根解析器并安装为进程默认管理器
///
/// 每个进程只能安装一次，重复调用返回 `RegistrationError`。
pub fn bootstrap(builder: IocBuilder) -> InfrastructureResult<IocManager> {
    if CURRENT.get().is_some() {
        return Err(already_bootstrapped().into());
    }

    let manager = IocManager::new(builder.create_resolver()?);
    if CURRENT.set(manager.clone()).is_err() {
        if let Err(e) = manager.dispose() {
            warn!("释放未安装的根解析器失败: {}", e);
        }
        return Err(already_bootstrapped().into());
    }

    info!("默认 IoC 管理器已安装");
    Ok(manager)
}

fn already_bootstrapped() -> DependencyError {
    DependencyError::registration("IocManager", "默认管理器已经安装")
}

/// 显式包装根解析器，不影响进程默认管理器
pub trait UseIocManager {
    fn use_ioc_manager(&self) -> IocManager;
}

impl UseIocManager for Arc<RootScope> {
    fn use_ioc_manager(&self) -> IocManager {
        IocManager::new(self.clone())
    }
}
