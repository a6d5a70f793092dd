//! 组件注册表与容器
//!
//! [`ComponentRegistry`] 在注册阶段可变，构建后连同装饰器注册表一起放入
//! [`Container`]，由根作用域和所有子作用域共享。

use crate::config::ContainerConfig;
use crate::decorator::DecoratorRegistry;
use di_abstractions::{AnyInstance, ComponentRegistration, Releaser};
use ioc_common::TypeInfo;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// 单个服务的注册索引
#[derive(Debug, Default)]
struct ServiceEntry {
    /// 暴露该服务的全部注册，按注册顺序
    all: Vec<usize>,
    /// 默认实现
    default: Option<usize>,
}

/// 组件注册表
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    registrations: Vec<Arc<ComponentRegistration>>,
    services: HashMap<TypeId, ServiceEntry>,
    /// 服务首次注册的顺序
    service_order: Vec<TypeInfo>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加注册，返回注册索引
    ///
    /// `keep_default = true` 且服务已有默认实现时，新注册只加入候选列表。
    pub fn add(&mut self, registration: ComponentRegistration, keep_default: bool) -> usize {
        let index = self.registrations.len();
        for service in registration.services() {
            if !self.services.contains_key(&service.id) {
                self.service_order.push(service);
            }
            let entry = self.services.entry(service.id).or_default();
            entry.all.push(index);
            if !keep_default || entry.default.is_none() {
                entry.default = Some(index);
            }
        }
        debug!(
            "添加组件注册 #{}: {} ({})",
            index,
            registration.implementation().short_name(),
            registration.lifetime()
        );
        self.registrations.push(Arc::new(registration));
        index
    }

    /// 服务的默认实现
    pub fn default_for(&self, service: TypeId) -> Option<(usize, &Arc<ComponentRegistration>)> {
        let index = self.services.get(&service)?.default?;
        Some((index, &self.registrations[index]))
    }

    /// 服务的全部实现，按注册顺序
    pub fn all_for(&self, service: TypeId) -> Vec<(usize, &Arc<ComponentRegistration>)> {
        self.services
            .get(&service)
            .map(|entry| {
                entry
                    .all
                    .iter()
                    .map(|&index| (index, &self.registrations[index]))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_registered(&self, service: TypeId) -> bool {
        self.services.contains_key(&service)
    }

    /// 已注册的服务，排除只由内部注册提供的服务
    pub fn registered_services(&self) -> Vec<TypeInfo> {
        self.service_order
            .iter()
            .filter(|service| {
                self.services[&service.id]
                    .all
                    .iter()
                    .any(|&index| !self.registrations[index].is_internal())
            })
            .copied()
            .collect()
    }

    /// 可启动的注册
    pub fn startables(&self) -> impl Iterator<Item = (usize, &Arc<ComponentRegistration>)> {
        self.registrations
            .iter()
            .enumerate()
            .filter(|(_, registration)| registration.is_startable())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

/// 实例缓存键：(注册索引, 服务类型)，服务为 `None` 时表示组件实例本身
pub(crate) type CacheKey = (usize, Option<TypeId>);

/// 共享实例缓存
///
/// 每个键对应一个 `OnceCell`，并发首次解析同一个键只会创建一个实例。
#[derive(Default)]
pub(crate) struct InstanceCache {
    cells: Mutex<HashMap<CacheKey, Arc<OnceCell<AnyInstance>>>>,
}

impl InstanceCache {
    pub(crate) fn cell(&self, key: CacheKey) -> Arc<OnceCell<AnyInstance>> {
        self.cells.lock().entry(key).or_default().clone()
    }

    pub(crate) fn clear(&self) {
        self.cells.lock().clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.cells
            .lock()
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }
}

/// 构建完成的容器
///
/// 持有注册表、装饰器和单例。释放容器会按创建的逆序释放单例。
pub struct Container {
    registry: ComponentRegistry,
    decorators: Arc<DecoratorRegistry>,
    config: ContainerConfig,
    singletons: InstanceCache,
    singleton_releasers: Mutex<Vec<Releaser>>,
    disposed: AtomicBool,
}

impl Container {
    pub fn new(registry: ComponentRegistry, decorators: Arc<DecoratorRegistry>, config: ContainerConfig) -> Self {
        Self {
            registry,
            decorators,
            config,
            singletons: InstanceCache::default(),
            singleton_releasers: Mutex::new(Vec::new()),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn decorators(&self) -> &DecoratorRegistry {
        &self.decorators
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// 已创建的单例数量
    pub fn singleton_count(&self) -> usize {
        self.singletons.len()
    }

    pub(crate) fn singletons(&self) -> &InstanceCache {
        &self.singletons
    }

    pub(crate) fn track_singleton(&self, releaser: Releaser) {
        self.singleton_releasers.lock().push(releaser);
    }

    /// 标记为已释放，之后的解析都会失败
    pub(crate) fn mark_disposed(&self) -> bool {
        !self.disposed.swap(true, Ordering::AcqRel)
    }

    /// 释放容器：标记为已释放，逆序释放单例
    pub(crate) fn dispose(&self) {
        self.mark_disposed();
        let releasers = std::mem::take(&mut *self.singleton_releasers.lock());
        let count = releasers.len();
        for release in releasers.into_iter().rev() {
            release();
        }
        self.singletons.clear();
        debug!("容器已释放，释放单例 {} 个", count);
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("registrations", &self.registry.len())
            .field("singletons", &self.singleton_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
