//! 组件生命周期管理

use serde::{Deserialize, Serialize};

/// 组件生命周期类型
///
/// 注册时确定，之后不可更改。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lifetime {
    /// 瞬时模式 - 每次解析都创建新实例
    #[default]
    Transient,
    /// 作用域模式 - 在同一作用域内共享实例
    LifetimeScope,
    /// 单例模式 - 整个根解析器生命周期内只创建一个实例
    Singleton,
}

impl Lifetime {
    /// 生命周期名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::LifetimeScope => "lifetime_scope",
            Self::Singleton => "singleton",
        }
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 生命周期标记 trait
pub trait LifecycleMarker: Send + Sync + 'static {
    /// 标记对应的生命周期
    const LIFETIME: Lifetime;
}

/// 单例生命周期标记
pub trait SingletonDependency: LifecycleMarker {}

/// 作用域生命周期标记
pub trait LifetimeScopeDependency: LifecycleMarker {}

/// 瞬时生命周期标记
pub trait TransientDependency: LifecycleMarker {}

/// 作用域状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    /// 可用
    Open,
    /// 已释放（终止状态）
    Disposed,
}

/// 作用域描述信息
#[derive(Debug, Clone)]
pub struct ScopeInfo {
    pub id: uuid::Uuid,
    pub name: String,
    /// 嵌套深度，根作用域为 0
    pub depth: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ScopeInfo {
    /// 创建根作用域信息
    pub fn root() -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: "root".to_string(),
            depth: 0,
            created_at: chrono::Utc::now(),
        }
    }

    /// 创建子作用域信息
    pub fn child(&self) -> Self {
        let id = uuid::Uuid::new_v4();
        Self {
            name: format!("{}.{}", self.name, &id.simple().to_string()[..8]),
            id,
            depth: self.depth + 1,
            created_at: chrono::Utc::now(),
        }
    }

    /// 是否为根作用域
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}
