//! # IoC 组合层
//!
//! 这个 crate 把服务注册、模块和根解析器组合成可直接使用的入口。
//!
//! ## 主要功能
//!
//! - **IoC 构建器**: 累积服务注册与模块，构建根解析器
//! - **模块**: 按模块组织注册，每个模块类型只注册一次
//! - **IoC 管理器**: 持有根解析器的上下文对象，可选安装为进程默认实例
//! - **日志初始化**: 基于 `tracing-subscriber` 的日志配置
//!
//! ## 基本使用
//!
//! ```rust,ignore
//! use ioc_composition::{bootstrap, IocBuilder, LoggingConfig};
//!
//! let manager = bootstrap(
//!     IocBuilder::new()
//!         .with_logging(LoggingConfig::development())
//!         .register_module::<StorageModule>()?
//!         .register_services(|r| {
//!             r.register::<dyn IGreeter, ConsoleGreeter>(Lifetime::Singleton, false)?;
//!             Ok(())
//!         })?,
//! )?;
//!
//! let greeter = manager.resolve::<dyn IGreeter>()?;
//! manager.using_scope(|scope| {
//!     // 作用域内解析的实例在回调返回后释放
//! })?;
//! manager.dispose()?;
//! ```

pub mod builder;
pub mod logging;
pub mod manager;
pub mod module;

#[cfg(test)]
mod tests;

// 重新导出主要类型
pub use builder::IocBuilder;
pub use logging::LoggingConfig;
pub use manager::{bootstrap, IocManager, UseIocManager};
pub use module::{Module, ModuleRegistry};

// 重新导出错误类型
pub use ioc_common::{DependencyError, InfrastructureError};
