//! 生命周期作用域
//!
//! 作用域拥有自己创建的 `LifetimeScope` 实例以及声明了 `NEEDS_RELEASE` 的瞬时实例，
//! 释放时按创建的逆序调用它们的释放回调，每个实例只释放一次。
//! 单例由容器拥有，从任意作用域解析都得到同一个实例。

use crate::container::{CacheKey, Container, InstanceCache};
use di_abstractions::{
    AnyInstance, Arguments, ComponentRegistration, Releaser, ResolutionChain, ResolveRequest,
    Resolver, ResolverContext, ScopeResolver,
};
use ioc_common::{DependencyError, DependencyResult, Lifetime, ScopeInfo, ScopeState, TypeInfo};
use parking_lot::Mutex;
use std::any::TypeId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// 生命周期作用域
pub struct LifetimeScope {
    container: Arc<Container>,
    info: ScopeInfo,
    /// 根作用域，单例在根作用域中构造
    root: Weak<LifetimeScope>,
    disposed: AtomicBool,
    instances: InstanceCache,
    owned: Mutex<Vec<Releaser>>,
    children: Mutex<Vec<Weak<LifetimeScope>>>,
}

impl LifetimeScope {
    /// 创建根作用域
    pub(crate) fn root(container: Arc<Container>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            container,
            info: ScopeInfo::root(),
            root: this.clone(),
            disposed: AtomicBool::new(false),
            instances: InstanceCache::default(),
            owned: Mutex::new(Vec::new()),
            children: Mutex::new(Vec::new()),
        })
    }

    /// 开启子作用域
    pub fn begin_lifetime_scope(&self) -> DependencyResult<Arc<LifetimeScope>> {
        self.ensure_open()?;
        let child = Arc::new(Self {
            container: self.container.clone(),
            info: self.info.child(),
            root: self.root.clone(),
            disposed: AtomicBool::new(false),
            instances: InstanceCache::default(),
            owned: Mutex::new(Vec::new()),
            children: Mutex::new(Vec::new()),
        });

        let mut children = self.children.lock();
        children.retain(|child| child.strong_count() > 0);
        children.push(Arc::downgrade(&child));
        drop(children);

        debug!("开启作用域: {} (深度 {})", child.info.name, child.info.depth);
        Ok(child)
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn info(&self) -> &ScopeInfo {
        &self.info
    }

    /// 本作用域缓存的共享实例数量
    pub fn cached_instance_count(&self) -> usize {
        self.instances.len()
    }

    /// 释放作用域
    ///
    /// 先释放仍然存活的子作用域，再逆序释放本作用域拥有的实例。重复调用无效果。
    pub fn dispose_scope(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        let children = std::mem::take(&mut *self.children.lock());
        for child in children.iter().rev().filter_map(Weak::upgrade) {
            child.dispose_scope();
        }

        let owned = std::mem::take(&mut *self.owned.lock());
        let count = owned.len();
        for release in owned.into_iter().rev() {
            release();
        }
        self.instances.clear();

        debug!("作用域已释放: {}，释放实例 {} 个", self.info.name, count);
    }

    fn ensure_open(&self) -> DependencyResult<()> {
        if self.disposed.load(Ordering::Acquire) || self.container.is_disposed() {
            return Err(DependencyError::disposed(format!("作用域 {}", self.info.name)));
        }
        Ok(())
    }

    fn root_scope(&self) -> DependencyResult<Arc<LifetimeScope>> {
        self.root
            .upgrade()
            .ok_or_else(|| DependencyError::disposed("根作用域"))
    }

    /// 解析注册对应的服务实例
    fn instance_for(
        &self,
        index: usize,
        registration: &ComponentRegistration,
        service: TypeInfo,
        arguments: &Arguments,
        chain: &ResolutionChain,
    ) -> DependencyResult<AnyInstance> {
        let component_chain = chain.enter_component(registration.implementation())?;
        match registration.lifetime() {
            Lifetime::Transient => {
                let component = self.activate(registration, arguments, &component_chain)?;
                self.expose(registration, service, &component, arguments, chain)
            }
            Lifetime::LifetimeScope => self.shared_instance(
                &self.instances,
                index,
                registration,
                service,
                arguments,
                chain,
                &component_chain,
            ),
            Lifetime::Singleton => {
                let root = self.root_scope()?;
                root.shared_instance(
                    self.container.singletons(),
                    index,
                    registration,
                    service,
                    arguments,
                    chain,
                    &component_chain,
                )
            }
        }
    }

    /// 共享实例：服务实例按 (注册, 服务) 缓存，装饰只发生一次
    #[allow(clippy::too_many_arguments)]
    fn shared_instance(
        &self,
        cache: &InstanceCache,
        index: usize,
        registration: &ComponentRegistration,
        service: TypeInfo,
        arguments: &Arguments,
        chain: &ResolutionChain,
        component_chain: &ResolutionChain,
    ) -> DependencyResult<AnyInstance> {
        let key: CacheKey = (index, Some(service.id));
        cache
            .cell(key)
            .get_or_try_init(|| {
                let component = self.shared_component(cache, index, registration, arguments, component_chain)?;
                self.expose(registration, service, &component, arguments, chain)
            })
            .cloned()
    }

    /// 共享组件实例，同一注册暴露的多个服务共用一个组件
    fn shared_component(
        &self,
        cache: &InstanceCache,
        index: usize,
        registration: &ComponentRegistration,
        arguments: &Arguments,
        component_chain: &ResolutionChain,
    ) -> DependencyResult<AnyInstance> {
        cache
            .cell((index, None))
            .get_or_try_init(|| self.activate(registration, arguments, component_chain))
            .cloned()
    }

    /// 创建组件实例并登记释放回调
    fn activate(
        &self,
        registration: &ComponentRegistration,
        arguments: &Arguments,
        component_chain: &ResolutionChain,
    ) -> DependencyResult<AnyInstance> {
        let ctx = ResolverContext::new(self, arguments, component_chain);
        let activated = registration.activate(&ctx)?;
        if let Some(releaser) = activated.releaser {
            match registration.lifetime() {
                Lifetime::Singleton => self.container.track_singleton(releaser),
                _ => self.owned.lock().push(releaser),
            }
        }
        debug!(
            "创建组件: {} ({}) 于作用域 {}",
            registration.implementation().short_name(),
            registration.lifetime(),
            self.info.name
        );
        Ok(activated.instance)
    }

    /// 组件实例转换为服务实例并经过装饰器
    fn expose(
        &self,
        registration: &ComponentRegistration,
        service: TypeInfo,
        component: &AnyInstance,
        arguments: &Arguments,
        chain: &ResolutionChain,
    ) -> DependencyResult<AnyInstance> {
        let instance = registration.adapt(&service, component)?;
        let ctx = ResolverContext::new(self, arguments, chain);
        self.container.decorators().decorate_dyn(service, instance, &ctx)
    }

    /// 获取组件实例本身（不转换、不装饰），用于启动可启动组件
    pub(crate) fn component_instance(
        &self,
        index: usize,
        registration: &ComponentRegistration,
    ) -> DependencyResult<AnyInstance> {
        self.ensure_open()?;
        let chain = ResolutionChain::new(self.max_resolution_depth());
        let component_chain = chain.enter_component(registration.implementation())?;
        let arguments = Arguments::empty();
        match registration.lifetime() {
            Lifetime::Transient => self.activate(registration, arguments, &component_chain),
            Lifetime::LifetimeScope => {
                self.shared_component(&self.instances, index, registration, arguments, &component_chain)
            }
            Lifetime::Singleton => {
                let root = self.root_scope()?;
                root.shared_component(
                    self.container.singletons(),
                    index,
                    registration,
                    arguments,
                    &component_chain,
                )
            }
        }
    }
}

impl Resolver for LifetimeScope {
    fn resolve_service(&self, request: ResolveRequest<'_>) -> DependencyResult<AnyInstance> {
        self.ensure_open()?;
        let chain = request.chain.extend(request.service)?;
        let (index, registration) = self
            .container
            .registry()
            .default_for(request.service.id)
            .ok_or_else(|| DependencyError::not_registered(request.service.full_name))?;
        self.instance_for(index, registration, request.service, request.arguments, &chain)
    }

    fn resolve_all_services(&self, request: ResolveRequest<'_>) -> DependencyResult<Vec<AnyInstance>> {
        self.ensure_open()?;
        let chain = request.chain.extend(request.service)?;
        self.container
            .registry()
            .all_for(request.service.id)
            .into_iter()
            .map(|(index, registration)| {
                self.instance_for(index, registration, request.service, request.arguments, &chain)
            })
            .collect()
    }

    fn registered_services(&self) -> Vec<TypeInfo> {
        self.container.registry().registered_services()
    }

    fn is_registered_by_type_id(&self, type_id: TypeId) -> bool {
        self.container.registry().is_registered(type_id)
    }

    fn max_resolution_depth(&self) -> usize {
        self.container.config().max_resolution_depth
    }
}

impl ScopeResolver for LifetimeScope {
    fn begin_scope(&self) -> DependencyResult<Arc<dyn ScopeResolver>> {
        let child: Arc<dyn ScopeResolver> = self.begin_lifetime_scope()?;
        Ok(child)
    }

    fn dispose(&self) -> DependencyResult<()> {
        self.dispose_scope();
        Ok(())
    }

    fn state(&self) -> ScopeState {
        if self.disposed.load(Ordering::Acquire) {
            ScopeState::Disposed
        } else {
            ScopeState::Open
        }
    }

    fn scope_info(&self) -> &ScopeInfo {
        &self.info
    }
}

impl Drop for LifetimeScope {
    fn drop(&mut self) {
        self.dispose_scope();
    }
}

impl std::fmt::Debug for LifetimeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifetimeScope")
            .field("name", &self.info.name)
            .field("depth", &self.info.depth)
            .field("state", &self.state())
            .finish()
    }
}
