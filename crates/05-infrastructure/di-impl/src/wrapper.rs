//! 可释放的对象包装器
//!
//! 包装器开启一个新作用域并在其中解析对象，释放包装器即释放该作用域，
//! 对象构造过程中在该作用域内解析出的其他实例也一并释放。

use di_abstractions::{IntoArguments, ResolverExt, ScopeResolver, Service};
use ioc_common::DependencyResult;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// 绑定作用域的对象
pub struct DisposableObjectWrapper<S: ?Sized + Service> {
    object: Arc<S>,
    scope: Arc<dyn ScopeResolver>,
    disposed: AtomicBool,
}

impl<S: ?Sized + Service> DisposableObjectWrapper<S> {
    /// 在 `resolver` 的新子作用域中解析 `S`
    pub fn new(resolver: &dyn ScopeResolver) -> DependencyResult<Self> {
        Self::with_arguments(resolver, ())
    }

    /// 携带构造参数在新子作用域中解析 `S`
    pub fn with_arguments(resolver: &dyn ScopeResolver, arguments: impl IntoArguments) -> DependencyResult<Self> {
        let scope = resolver.begin_scope()?;
        match scope.resolve_with::<S>(arguments) {
            Ok(object) => Ok(Self {
                object,
                scope,
                disposed: AtomicBool::new(false),
            }),
            Err(e) => {
                scope.dispose()?;
                Err(e)
            }
        }
    }

    /// 包装的对象
    pub fn object(&self) -> &Arc<S> {
        &self.object
    }

    /// 对象所属的作用域
    pub fn scope(&self) -> &dyn ScopeResolver {
        self.scope.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// 释放作用域，重复调用无效果
    pub fn dispose(&self) -> DependencyResult<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.scope.dispose()
    }
}

impl<S: ?Sized + Service> Deref for DisposableObjectWrapper<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.object
    }
}

impl<S: ?Sized + Service> Drop for DisposableObjectWrapper<S> {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            warn!("对象包装器释放作用域失败: {}", e);
        }
    }
}
