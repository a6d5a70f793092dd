//! # IoC Common
//!
//! 这个 crate 提供了 IoC manager 各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`Lifetime`] - 组件生命周期（瞬时 / 作用域 / 单例）
//! - [`SingletonDependency`] / [`TransientDependency`] / [`LifetimeScopeDependency`] - 约定注册使用的生命周期标记
//! - [`TypeInfo`] - 服务与实现的类型元数据
//! - [`NamingConventions`] - 默认接口命名约定
//! - [`DependencyError`] - 依赖注入错误分类
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 约定优于配置
//! - 所有错误显式返回，不做静默恢复

pub mod conventions;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use conventions::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
