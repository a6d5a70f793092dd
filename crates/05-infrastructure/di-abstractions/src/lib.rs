//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义服务解析、作用域和注册的核心接口。
//!
//! ## 核心接口
//!
//! - [`Resolver`] / [`ResolverExt`] - 服务解析器接口
//! - [`ScopeResolver`] / [`RootResolver`] - 作用域与根解析器接口
//! - [`ServiceRegistration`] - 服务注册门面接口
//! - [`Injectable`] / [`Implements`] - 组件构造与服务转换
//! - [`Assembly`] - 约定注册的组件目录

pub mod arguments;
pub mod assembly;
pub mod component;
pub mod events;
pub mod registration;
pub mod registry;
pub mod resolver;
pub mod scope;

pub use arguments::*;
pub use assembly::*;
pub use component::*;
pub use events::*;
pub use registration::*;
pub use registry::*;
pub use resolver::*;
pub use scope::*;

pub use ioc_common::{DependencyError, DependencyResult, Lifetime, TypeInfo};

/// 过程宏生成代码使用的路径，不属于公开接口
#[doc(hidden)]
pub mod __private {
    pub use ctor::ctor;
    pub use ioc_common::{
        LifecycleMarker, Lifetime, LifetimeScopeDependency, SingletonDependency, TransientDependency,
    };
}
