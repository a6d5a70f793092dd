//! 解析器抽象接口
//!
//! [`Resolver`] 是对象安全的核心接口，按 [`TypeInfo`] 解析类型擦除的实例；
//! [`ResolverExt`] 在其上提供强类型的便捷方法，所有解析器（包括 `dyn Resolver`）自动获得。

use crate::arguments::{Arguments, IntoArguments};
use crate::component::{downcast_instance, AnyInstance, Service};
use ioc_common::{DependencyError, DependencyResult, TypeInfo};
use std::any::TypeId;
use std::sync::Arc;

/// 默认最大解析深度
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 64;

/// 一次解析请求
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    /// 请求的服务类型
    pub service: TypeInfo,
    /// 本次请求附带的参数
    pub arguments: &'a Arguments,
    /// 调用方所在的解析链
    pub chain: &'a ResolutionChain,
}

impl<'a> ResolveRequest<'a> {
    pub fn new(service: TypeInfo, arguments: &'a Arguments, chain: &'a ResolutionChain) -> Self {
        Self {
            service,
            arguments,
            chain,
        }
    }
}

/// 解析器 trait
pub trait Resolver: Send + Sync {
    /// 解析服务的默认实现
    fn resolve_service(&self, request: ResolveRequest<'_>) -> DependencyResult<AnyInstance>;

    /// 按注册顺序解析服务的全部实现，未注册时返回空列表
    fn resolve_all_services(&self, request: ResolveRequest<'_>) -> DependencyResult<Vec<AnyInstance>>;

    /// 已注册的服务类型，不包含框架内部服务
    fn registered_services(&self) -> Vec<TypeInfo>;

    /// 检查服务是否已注册（使用 TypeId）
    fn is_registered_by_type_id(&self, type_id: TypeId) -> bool;

    /// 最大解析深度
    fn max_resolution_depth(&self) -> usize {
        DEFAULT_MAX_RESOLUTION_DEPTH
    }
}

/// 强类型解析方法
pub trait ResolverExt: Resolver {
    /// 解析服务
    fn resolve<S: ?Sized + Service>(&self) -> DependencyResult<Arc<S>> {
        self.resolve_with::<S>(())
    }

    /// 携带构造参数解析服务
    fn resolve_with<S: ?Sized + Service>(&self, arguments: impl IntoArguments) -> DependencyResult<Arc<S>> {
        let arguments = arguments.into_arguments();
        let chain = ResolutionChain::new(self.max_resolution_depth());
        let instance =
            self.resolve_service(ResolveRequest::new(TypeInfo::of::<S>(), &arguments, &chain))?;
        downcast_instance::<S>(&instance)
    }

    /// 按运行时类型解析服务，返回类型擦除的实例
    fn resolve_by_type(&self, service: TypeInfo) -> DependencyResult<AnyInstance> {
        self.resolve_by_type_with(service, ())
    }

    /// 按运行时类型携带构造参数解析服务
    fn resolve_by_type_with(
        &self,
        service: TypeInfo,
        arguments: impl IntoArguments,
    ) -> DependencyResult<AnyInstance> {
        let arguments = arguments.into_arguments();
        let chain = ResolutionChain::new(self.max_resolution_depth());
        self.resolve_service(ResolveRequest::new(service, &arguments, &chain))
    }

    /// 按运行时类型解析服务的全部实现
    fn resolve_all_by_type(&self, service: TypeInfo) -> DependencyResult<Vec<AnyInstance>> {
        let chain = ResolutionChain::new(self.max_resolution_depth());
        self.resolve_all_services(ResolveRequest::new(service, Arguments::empty(), &chain))
    }

    /// 解析可选服务，未注册时返回 `None`
    fn try_resolve<S: ?Sized + Service>(&self) -> DependencyResult<Option<Arc<S>>> {
        if !self.is_registered::<S>() {
            return Ok(None);
        }
        self.resolve::<S>().map(Some)
    }

    /// 解析服务的全部实现
    fn resolve_all<S: ?Sized + Service>(&self) -> DependencyResult<Vec<Arc<S>>> {
        self.resolve_all_with::<S>(())
    }

    /// 携带构造参数解析服务的全部实现
    fn resolve_all_with<S: ?Sized + Service>(
        &self,
        arguments: impl IntoArguments,
    ) -> DependencyResult<Vec<Arc<S>>> {
        let arguments = arguments.into_arguments();
        let chain = ResolutionChain::new(self.max_resolution_depth());
        self.resolve_all_services(ResolveRequest::new(TypeInfo::of::<S>(), &arguments, &chain))?
            .iter()
            .map(downcast_instance::<S>)
            .collect()
    }

    /// 检查服务是否已注册
    fn is_registered<S: ?Sized + 'static>(&self) -> bool {
        self.is_registered_by_type_id(TypeId::of::<S>())
    }

    /// 检查服务是否已注册（使用运行时类型）
    fn is_registered_type(&self, service: TypeInfo) -> bool {
        self.is_registered_by_type_id(service.id)
    }
}

impl<R: Resolver + ?Sized> ResolverExt for R {}

/// 解析链
///
/// 记录当前正在解析的服务和组件，用于检测循环依赖和限制解析深度。
#[derive(Debug, Clone)]
pub struct ResolutionChain {
    entries: Vec<TypeInfo>,
    max_depth: usize,
}

impl ResolutionChain {
    /// 创建空的解析链
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_depth,
        }
    }

    /// 进入服务解析，返回延长后的解析链
    pub fn extend(&self, service: TypeInfo) -> DependencyResult<Self> {
        if self.contains(&service) {
            return Err(DependencyError::CircularDependency {
                dependency_chain: self.describe_with(&service),
            });
        }
        if self.entries.len() >= self.max_depth {
            return Err(DependencyError::resolution_failed(
                service.full_name,
                format!("超过最大解析深度 {}: {}", self.max_depth, self.describe()),
            ));
        }
        let mut entries = self.entries.clone();
        entries.push(service);
        Ok(Self {
            entries,
            max_depth: self.max_depth,
        })
    }

    /// 进入组件构造
    ///
    /// 以实现类型自身注册的服务已经在链尾，不重复记录。
    pub fn enter_component(&self, implementation: TypeInfo) -> DependencyResult<Self> {
        if self.entries.last() == Some(&implementation) {
            return Ok(self.clone());
        }
        self.extend(implementation)
    }

    pub fn contains(&self, type_info: &TypeInfo) -> bool {
        self.entries.contains(type_info)
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// 解析链描述，例如 `IA -> B -> IC`
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.short_name())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    fn describe_with(&self, next: &TypeInfo) -> String {
        if self.entries.is_empty() {
            return next.short_name().to_string();
        }
        format!("{} -> {}", self.describe(), next.short_name())
    }
}

impl Default for ResolutionChain {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESOLUTION_DEPTH)
    }
}

/// 解析上下文
///
/// 传给组件构造、工厂和装饰器。依赖从当前作用域解析，
/// 嵌套解析不继承本次请求的参数。
#[derive(Clone, Copy)]
pub struct ResolverContext<'a> {
    resolver: &'a dyn Resolver,
    arguments: &'a Arguments,
    chain: &'a ResolutionChain,
}

impl<'a> ResolverContext<'a> {
    pub fn new(resolver: &'a dyn Resolver, arguments: &'a Arguments, chain: &'a ResolutionChain) -> Self {
        Self {
            resolver,
            arguments,
            chain,
        }
    }

    /// 当前作用域的解析器
    pub fn resolver(&self) -> &'a dyn Resolver {
        self.resolver
    }

    /// 本次请求的参数
    pub fn arguments(&self) -> &'a Arguments {
        self.arguments
    }

    /// 当前解析链
    pub fn chain(&self) -> &'a ResolutionChain {
        self.chain
    }

    /// 解析依赖
    pub fn resolve<S: ?Sized + Service>(&self) -> DependencyResult<Arc<S>> {
        self.resolve_with::<S>(())
    }

    /// 携带构造参数解析依赖
    pub fn resolve_with<S: ?Sized + Service>(&self, arguments: impl IntoArguments) -> DependencyResult<Arc<S>> {
        let arguments = arguments.into_arguments();
        let instance = self.resolver.resolve_service(ResolveRequest::new(
            TypeInfo::of::<S>(),
            &arguments,
            self.chain,
        ))?;
        downcast_instance::<S>(&instance)
    }

    /// 解析可选依赖，未注册时返回 `None`
    pub fn try_resolve<S: ?Sized + Service>(&self) -> DependencyResult<Option<Arc<S>>> {
        if !self.resolver.is_registered_by_type_id(TypeId::of::<S>()) {
            return Ok(None);
        }
        self.resolve::<S>().map(Some)
    }

    /// 解析依赖的全部实现
    pub fn resolve_all<S: ?Sized + Service>(&self) -> DependencyResult<Vec<Arc<S>>> {
        self.resolver
            .resolve_all_services(ResolveRequest::new(
                TypeInfo::of::<S>(),
                Arguments::empty(),
                self.chain,
            ))?
            .iter()
            .map(downcast_instance::<S>)
            .collect()
    }

    /// 获取必需参数
    pub fn argument<T: Clone + 'static>(&self) -> DependencyResult<T> {
        self.arguments
            .get::<T>()
            .ok_or_else(|| DependencyError::ArgumentNull {
                argument_name: std::any::type_name::<T>().to_string(),
            })
    }

    /// 获取可选参数
    pub fn try_argument<T: Clone + 'static>(&self) -> Option<T> {
        self.arguments.get::<T>()
    }
}

impl std::fmt::Debug for ResolverContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverContext")
            .field("arguments", self.arguments)
            .field("chain", &self.chain.describe())
            .finish()
    }
}
