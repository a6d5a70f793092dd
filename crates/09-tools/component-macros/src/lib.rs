//! # Component Macros
//!
//! 这个 crate 提供了约定注册和属性注入的过程宏。
//!
//! ## 核心宏
//!
//! - [`component`] - 声明生命周期和服务，并登记到所在 crate 的约定目录
//! - [`Injectable`] - 按字段类型生成构造逻辑（属性注入）
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::{component, Injectable};
//! use std::sync::Arc;
//!
//! #[derive(Injectable)]
//! #[component(scoped, services(dyn IOrderService))]
//! pub struct OrderService {
//!     repository: Arc<dyn IOrderRepository>,
//!     audit: Option<Arc<dyn IAuditLog>>,
//!     #[do_not_inject]
//!     cache: Option<Arc<dyn ICache>>,
//! }
//!
//! let assembly = di_abstractions::this_assembly!();
//! registration.register_assembly_by_convention(&assembly)?;
//! ```
//!
//! 生成的代码通过 `::di_abstractions` 路径引用运行时类型，使用方需要依赖 `di-abstractions`。

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, ItemStruct};

mod component;
mod injectable;
mod utils;

// Re-exports are not allowed in proc-macro crates

/// 约定注册宏
///
/// 为结构体实现对应的生命周期标记 trait、为声明的每个服务实现 `Implements`，
/// 并在程序启动时把组件登记到当前 crate 的约定目录中。
///
/// # 参数
///
/// - `singleton` - 单例生命周期
/// - `scoped` - 作用域生命周期
/// - `transient` - 瞬时生命周期（默认）
/// - `services(dyn A, dyn B)` - 组件提供的服务
/// - `startable` - 构建根解析器后启动组件，组件需要实现 `Startable`
///
/// # 示例
///
/// ```rust,ignore
/// #[derive(Injectable)]
/// #[component(singleton, services(dyn IGreeter), startable)]
/// pub struct ConsoleGreeter;
/// ```
#[proc_macro_attribute]
pub fn component(args: TokenStream, input: TokenStream) -> TokenStream {
    let input_struct = parse_macro_input!(input as ItemStruct);
    component::component_impl(args.into(), input_struct)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// 属性注入派生宏
///
/// 字段按类型注入：
///
/// - `Arc<T>` - 必需依赖
/// - `Option<Arc<T>>` - 可选依赖，未注册时为 `None`
/// - `Vec<Arc<T>>` - 服务的全部实现
/// - `#[inject(arg)]` - 从解析参数中按类型获取
/// - `#[do_not_inject]` 或其他类型 - `Default::default()`
///
/// 结构体上的 `#[injectable(release = "method")]` 指定释放时调用的方法，
/// 实例由所属作用域跟踪；未指定时容器不持有瞬时实例。
///
/// # 示例
///
/// ```rust,ignore
/// #[derive(Injectable)]
/// #[injectable(release = "close")]
/// pub struct Connection {
///     #[inject(arg)]
///     url: String,
///     logger: Arc<dyn ILogger>,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject, do_not_inject, injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    injectable::derive_injectable_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
