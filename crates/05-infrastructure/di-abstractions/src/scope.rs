//! 作用域解析器抽象接口
//!
//! 作用域状态只有 `Open -> Disposed` 一个方向。根作用域拥有容器本身，
//! 释放时先通知订阅者，再释放作用域链，最后释放容器。

use crate::events::OnDisposingHandler;
use crate::resolver::Resolver;
use ioc_common::{DependencyResult, ScopeInfo, ScopeState};
use std::sync::Arc;

/// 作用域解析器
pub trait ScopeResolver: Resolver {
    /// 开启子作用域
    fn begin_scope(&self) -> DependencyResult<Arc<dyn ScopeResolver>>;

    /// 释放作用域，重复调用无效果
    fn dispose(&self) -> DependencyResult<()>;

    /// 作用域状态
    fn state(&self) -> ScopeState;

    /// 作用域描述信息
    fn scope_info(&self) -> &ScopeInfo;

    fn is_disposed(&self) -> bool {
        self.state() == ScopeState::Disposed
    }
}

/// 根解析器
pub trait RootResolver: ScopeResolver {
    /// 订阅释放通知
    fn on_disposing(&self, handler: OnDisposingHandler);
}
