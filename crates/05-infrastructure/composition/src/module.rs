//! 模块化注册

use crate::builder::IocBuilder;
use ioc_common::{DependencyError, DependencyResult};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 注册模块
///
/// 模块把一组相关的注册组织在一起，每个模块类型在一个构建器中只注册一次。
///
/// ```ignore
/// #[derive(Default)]
/// struct StorageModule;
///
/// impl Module for StorageModule {
///     fn register(&self, builder: IocBuilder) -> DependencyResult<IocBuilder> {
///         builder.register_services(|r| {
///             r.register::<dyn IStorage, FileStorage>(Lifetime::Singleton, false)?;
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Module: Send + Sync + 'static {
    /// 向构建器添加本模块的注册
    fn register(&self, builder: IocBuilder) -> DependencyResult<IocBuilder>;

    /// 模块名称
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// 已注册模块的登记表
///
/// 构建完成后作为单例注册到容器中。
#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    names: Vec<&'static str>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记模块，同一模块类型重复登记返回 `DuplicateModule`
    pub fn add<M: Module>(&mut self, module: Arc<M>) -> DependencyResult<()> {
        let type_id = TypeId::of::<M>();
        if self.modules.contains_key(&type_id) {
            return Err(DependencyError::DuplicateModule {
                module_name: module.name().to_string(),
            });
        }
        debug!("登记模块: {}", module.name());
        self.names.push(module.name());
        self.modules.insert(type_id, module);
        Ok(())
    }

    pub fn contains<M: Module>(&self) -> bool {
        self.modules.contains_key(&TypeId::of::<M>())
    }

    /// 获取模块实例
    pub fn get_module<M: Module>(&self) -> DependencyResult<Arc<M>> {
        self.try_get_module::<M>().ok_or_else(|| DependencyError::ModuleNotRegistered {
            module_name: type_name::<M>().to_string(),
        })
    }

    pub fn try_get_module<M: Module>(&self) -> Option<Arc<M>> {
        self.modules
            .get(&TypeId::of::<M>())
            .cloned()
            .and_then(|module| module.downcast::<M>().ok())
    }

    /// 按登记顺序返回模块名称
    pub fn module_names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry").field("modules", &self.names).finish()
    }
}
