//! 服务注册门面抽象接口

use crate::assembly::Assembly;
use crate::component::{Implements, Injectable, Service};
use crate::events::{
    BeforeRegistrationCompletedEventArgs, OnConventionalRegisteringEventArgs, OnDisposingEventArgs,
    OnRegisteringEventArgs, RegistrationCompletedEventArgs,
};
use crate::registry::ComponentRegistration;
use crate::resolver::ResolverContext;
use crate::scope::RootResolver;
use ioc_common::{BoxError, DependencyResult, Lifetime};
use std::sync::Arc;

/// 服务注册门面
///
/// 在根解析器构建之前收集注册信息。所有对服务的解析都会经过装饰器注册表。
/// `keep_default = true` 时，若服务已有默认实现则保留它，新注册只能通过解析全部实现获得。
pub trait ServiceRegistration: Sized + Send {
    /// 构建得到的根解析器类型
    type Root: RootResolver;

    /// 注册实现 `I` 为服务 `S` 的提供者，同时以 `I` 自身暴露
    fn register<S, I>(&mut self, lifetime: Lifetime, keep_default: bool) -> DependencyResult<&mut Self>
    where
        S: ?Sized + Service,
        I: Injectable + Implements<S>;

    /// 以实现类型自身注册
    fn register_type<I: Injectable>(&mut self, lifetime: Lifetime, keep_default: bool) -> DependencyResult<&mut Self>;

    /// 注册服务工厂
    fn register_factory<S, F>(
        &mut self,
        factory: F,
        lifetime: Lifetime,
        keep_default: bool,
    ) -> DependencyResult<&mut Self>
    where
        S: ?Sized + Service,
        F: Fn(&ResolverContext<'_>) -> DependencyResult<Arc<S>> + Send + Sync + 'static;

    /// 注册预先构建的单例实例
    fn register_instance<S: ?Sized + Service>(
        &mut self,
        instance: Arc<S>,
        keep_default: bool,
    ) -> DependencyResult<&mut Self>;

    /// 注册完整的组件描述
    fn register_component(
        &mut self,
        registration: impl Into<ComponentRegistration>,
        keep_default: bool,
    ) -> DependencyResult<&mut Self>;

    /// 服务尚无任何注册时才注册
    fn register_if_absent<S, I>(&mut self, lifetime: Lifetime) -> DependencyResult<&mut Self>
    where
        S: ?Sized + Service,
        I: Injectable + Implements<S>;

    /// 实现类型尚无任何注册时才注册
    fn register_type_if_absent<I: Injectable>(&mut self, lifetime: Lifetime) -> DependencyResult<&mut Self>;

    /// 为服务 `S` 追加装饰器
    fn decorate<S, F>(&mut self, decorator: F) -> &mut Self
    where
        S: ?Sized + Service,
        F: Fn(&ResolverContext<'_>, Arc<S>) -> DependencyResult<Arc<S>> + Send + Sync + 'static;

    /// 按约定注册程序集中的组件
    fn register_assembly_by_convention(&mut self, assembly: &Assembly) -> DependencyResult<&mut Self>;

    /// 服务是否已有注册
    fn is_registered<S: ?Sized + 'static>(&self) -> bool;

    fn on_registering(
        &mut self,
        handler: impl Fn(&OnRegisteringEventArgs) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self;

    fn on_conventional_registering(
        &mut self,
        handler: impl Fn(&OnConventionalRegisteringEventArgs) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self;

    fn before_registration_completed(
        &mut self,
        handler: impl Fn(&BeforeRegistrationCompletedEventArgs) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self;

    fn registration_completed(
        &mut self,
        handler: impl Fn(&RegistrationCompletedEventArgs<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self;

    fn on_disposing(
        &mut self,
        handler: impl Fn(&OnDisposingEventArgs<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut Self;

    /// 构建根解析器并启动可启动组件
    fn create_resolver(self) -> DependencyResult<Arc<Self::Root>>;

    /// 构建根解析器，不启动可启动组件
    fn create_resolver_ignoring_startables(self) -> DependencyResult<Arc<Self::Root>>;
}
