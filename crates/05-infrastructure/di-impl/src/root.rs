//! 根解析器
//!
//! 释放流程只执行一次：通知释放订阅者 -> 释放作用域链 -> 释放容器。
//! 订阅者失败时的行为由 [`DisposalPolicy`] 决定。未调用 `dispose` 的根解析器
//! 在 drop 时执行同样的流程。

use crate::config::DisposalPolicy;
use crate::container::Container;
use crate::scope::LifetimeScope;
use di_abstractions::{
    AnyInstance, OnDisposingEventArgs, OnDisposingHandler, ResolveRequest, Resolver, RootResolver,
    ScopeResolver,
};
use ioc_common::{DependencyError, DependencyResult, ScopeInfo, ScopeState, TypeInfo};
use parking_lot::RwLock;
use std::any::TypeId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 根解析器
pub struct RootScope {
    scope: Arc<LifetimeScope>,
    disposing_handlers: RwLock<Vec<OnDisposingHandler>>,
    disposed: AtomicBool,
}

impl RootScope {
    pub(crate) fn new(container: Arc<Container>, disposing_handlers: Vec<OnDisposingHandler>) -> Arc<Self> {
        Arc::new(Self {
            scope: LifetimeScope::root(container),
            disposing_handlers: RwLock::new(disposing_handlers),
            disposed: AtomicBool::new(false),
        })
    }

    /// 开启子作用域
    pub fn begin_lifetime_scope(&self) -> DependencyResult<Arc<LifetimeScope>> {
        self.scope.begin_lifetime_scope()
    }

    /// 根作用域
    pub fn scope(&self) -> &Arc<LifetimeScope> {
        &self.scope
    }

    pub fn container(&self) -> &Arc<Container> {
        self.scope.container()
    }

    pub fn disposal_policy(&self) -> DisposalPolicy {
        self.container().config().disposal_policy
    }

    /// 启动全部可启动组件
    pub(crate) fn start_components(&self) -> DependencyResult<usize> {
        let mut started = 0;
        for (index, registration) in self.container().registry().startables() {
            let component = self.scope.component_instance(index, registration)?;
            registration.start(&component).map_err(|e| DependencyError::LifecycleError {
                message: format!("组件 {} 启动失败: {}", registration.implementation().short_name(), e),
            })?;
            started += 1;
        }
        if started > 0 {
            info!("已启动 {} 个可启动组件", started);
        }
        Ok(started)
    }

    /// 通知释放订阅者，返回收集到的错误
    fn notify_disposing(&self) -> Result<Vec<String>, DependencyError> {
        let handlers = self.disposing_handlers.read().clone();
        let args = OnDisposingEventArgs {
            resolver: self,
            scope: self.scope.info(),
        };
        let policy = self.disposal_policy();

        let mut errors = Vec::new();
        for handler in handlers {
            if let Err(e) = handler(&args) {
                warn!("释放通知处理失败: {}", e);
                if policy == DisposalPolicy::AbortOnError {
                    return Err(DependencyError::LifecycleError {
                        message: format!("释放通知处理失败: {}", e),
                    });
                }
                errors.push(e.to_string());
            }
        }
        Ok(errors)
    }
}

impl Resolver for RootScope {
    fn resolve_service(&self, request: ResolveRequest<'_>) -> DependencyResult<AnyInstance> {
        self.scope.resolve_service(request)
    }

    fn resolve_all_services(&self, request: ResolveRequest<'_>) -> DependencyResult<Vec<AnyInstance>> {
        self.scope.resolve_all_services(request)
    }

    fn registered_services(&self) -> Vec<TypeInfo> {
        self.scope.registered_services()
    }

    fn is_registered_by_type_id(&self, type_id: TypeId) -> bool {
        self.scope.is_registered_by_type_id(type_id)
    }

    fn max_resolution_depth(&self) -> usize {
        self.scope.max_resolution_depth()
    }
}

impl ScopeResolver for RootScope {
    fn begin_scope(&self) -> DependencyResult<Arc<dyn ScopeResolver>> {
        self.scope.begin_scope()
    }

    fn dispose(&self) -> DependencyResult<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        info!("开始释放根解析器");

        let errors = match self.notify_disposing() {
            Ok(errors) => errors,
            Err(e) => {
                error!("根解析器释放中止: {}", e);
                self.container().mark_disposed();
                return Err(e);
            }
        };

        self.scope.dispose_scope();
        self.container().dispose();
        info!("根解析器已释放");

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DependencyError::DisposalFailed { errors })
        }
    }

    fn state(&self) -> ScopeState {
        if self.disposed.load(Ordering::Acquire) {
            ScopeState::Disposed
        } else {
            ScopeState::Open
        }
    }

    fn scope_info(&self) -> &ScopeInfo {
        self.scope.info()
    }
}

impl RootResolver for RootScope {
    fn on_disposing(&self, handler: OnDisposingHandler) {
        self.disposing_handlers.write().push(handler);
    }
}

/// 未显式释放的根解析器在最后一个引用释放时执行同样的释放流程
impl Drop for RootScope {
    fn drop(&mut self) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }
        if let Err(e) = self.dispose() {
            warn!("根解析器在 drop 时释放失败: {}", e);
        }
    }
}

impl std::fmt::Debug for RootScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootScope")
            .field("container", self.container())
            .field("state", &self.state())
            .field("disposing_handlers", &self.disposing_handlers.read().len())
            .finish()
    }
}
