//! 组件抽象
//!
//! 服务以 `Arc<S>` 的形式交付，`S` 通常是 `dyn Trait`。容器内部统一以
//! [`AnyInstance`] 保存实例，其内部装的是 `Arc<S>`。

use crate::resolver::ResolverContext;
use ioc_common::{BoxError, DependencyError, DependencyResult};
use std::any::Any;
use std::sync::Arc;

/// 类型擦除后的实例，内部是 `Arc<S>`
pub type AnyInstance = Arc<dyn Any + Send + Sync>;

/// 可作为服务类型的标记 trait
///
/// `dyn Trait` 需要声明 `Send + Sync` 超 trait 才能成为服务。
pub trait Service: Send + Sync + 'static {}

impl<T: ?Sized + Send + Sync + 'static> Service for T {}

/// 将服务实例擦除为 [`AnyInstance`]
pub fn into_any<S: ?Sized + Service>(instance: Arc<S>) -> AnyInstance {
    Arc::new(instance)
}

/// 从 [`AnyInstance`] 还原服务实例
pub fn downcast_instance<S: ?Sized + Service>(instance: &AnyInstance) -> DependencyResult<Arc<S>> {
    instance
        .downcast_ref::<Arc<S>>()
        .cloned()
        .ok_or_else(|| DependencyError::TypeMismatch {
            expected: std::any::type_name::<Arc<S>>().to_string(),
            actual: "<类型擦除实例>".to_string(),
        })
}

/// 可由容器构造的组件
///
/// 通常由 `#[derive(Injectable)]` 生成。
pub trait Injectable: Send + Sync + Sized + 'static {
    /// 为 `true` 时实例由创建它的作用域跟踪，作用域释放时调用 [`release`](Self::release)。
    ///
    /// 为 `false` 时容器不持有瞬时实例，最后一个 `Arc` 释放后实例即被回收。
    const NEEDS_RELEASE: bool = false;

    /// 从解析上下文构造组件
    fn inject(ctx: &ResolverContext<'_>) -> Result<Self, DependencyError>;

    /// 所属作用域释放时调用，每个实例最多一次；需同时设置 `NEEDS_RELEASE`
    fn release(&self) {}
}

/// 实现类型到服务类型的转换
///
/// 每个 `impl Trait for Type` 对应一个 `Implements<dyn Trait>`，
/// 通常用 [`implements!`](crate::implements) 或 `#[component(services(...))]` 生成。
pub trait Implements<S: ?Sized + 'static>: Send + Sync + 'static {
    fn upcast(self: Arc<Self>) -> Arc<S>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// 构建完成后需要启动的组件
pub trait Startable: Send + Sync + 'static {
    fn start(&self) -> Result<(), BoxError>;
}

/// 为实现类型声明它提供的服务
///
/// ```ignore
/// implements!(ConsoleGreeter => dyn IGreeter, dyn IConsole);
/// ```
#[macro_export]
macro_rules! implements {
    ($implementation:ty => $($service:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$service> for $implementation {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$service> {
                    self
                }
            }
        )+
    };
}
