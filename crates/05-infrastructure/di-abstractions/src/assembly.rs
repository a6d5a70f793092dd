//! 约定注册的组件目录
//!
//! Rust 没有运行时反射，约定扫描改为显式的组件目录：每个 crate 中标注了
//! `#[component]` 的类型在程序启动时把自己登记到全局目录，
//! [`Assembly::of_crate`] 按 crate 名称收集它们。也可以手工构建 [`Assembly`]。

use crate::component::Injectable;
use crate::registry::{ComponentRegistration, ComponentRegistrationBuilder};
use ioc_common::{LifecycleMarker, Lifetime, TypeInfo};
use std::collections::HashMap;
use tracing::debug;

/// 组件目录条目的构造函数
pub type ComponentFactoryFn = fn() -> ConventionalComponent;

/// 全局组件目录，按 crate 名称分组
static GLOBAL_COMPONENT_CATALOG: once_cell::sync::Lazy<
    parking_lot::RwLock<HashMap<&'static str, Vec<ComponentFactoryFn>>>,
> = once_cell::sync::Lazy::new(|| parking_lot::RwLock::new(HashMap::new()));

/// 登记组件到全局目录
///
/// 由 `#[component]` 生成的启动函数调用。
pub fn submit_component(crate_name: &'static str, factory: ComponentFactoryFn) {
    GLOBAL_COMPONENT_CATALOG
        .write()
        .entry(crate_name)
        .or_default()
        .push(factory);
}

/// 约定注册的组件
///
/// 生命周期来自组件实现的生命周期标记，服务列表是组件声明的全部服务。
#[derive(Debug, Clone)]
pub struct ConventionalComponent {
    registration: ComponentRegistration,
}

impl ConventionalComponent {
    /// 创建约定组件，`declare` 声明组件提供的服务
    pub fn new<T>(
        declare: impl FnOnce(ComponentRegistrationBuilder<T>) -> ComponentRegistrationBuilder<T>,
    ) -> Self
    where
        T: Injectable + LifecycleMarker,
    {
        let builder = ComponentRegistration::of::<T>(T::LIFETIME).as_self();
        Self {
            registration: declare(builder).build(),
        }
    }

    pub fn implementation(&self) -> TypeInfo {
        self.registration.implementation()
    }

    pub fn lifetime(&self) -> Lifetime {
        self.registration.lifetime()
    }

    /// 组件声明的服务，不含实现类型自身
    pub fn declared_services(&self) -> Vec<TypeInfo> {
        let implementation = self.implementation();
        self.registration
            .services()
            .filter(|service| *service != implementation)
            .collect()
    }

    pub fn registration(&self) -> &ComponentRegistration {
        &self.registration
    }

    pub fn into_registration(self) -> ComponentRegistration {
        self.registration
    }
}

/// 一组可按约定注册的组件
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    name: String,
    components: Vec<ConventionalComponent>,
}

impl Assembly {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
        }
    }

    /// 收集指定 crate 登记到全局目录的组件
    pub fn of_crate(crate_name: &str) -> Self {
        let factories = GLOBAL_COMPONENT_CATALOG
            .read()
            .get(crate_name)
            .cloned()
            .unwrap_or_default();
        debug!("从组件目录收集 {} 个组件: {}", factories.len(), crate_name);

        let mut components: Vec<_> = factories.into_iter().map(|factory| factory()).collect();
        // 登记顺序取决于启动函数的执行顺序，按类型名排序保证结果稳定
        components.sort_by_key(|component| component.implementation().full_name);
        Self {
            name: crate_name.to_string(),
            components,
        }
    }

    /// 添加组件
    pub fn with_component(mut self, component: ConventionalComponent) -> Self {
        self.components.push(component);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> &[ConventionalComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// 当前 crate 的组件目录
#[macro_export]
macro_rules! this_assembly {
    () => {
        $crate::Assembly::of_crate(env!("CARGO_PKG_NAME"))
    };
}
