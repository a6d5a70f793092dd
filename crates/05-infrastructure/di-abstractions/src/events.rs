//! 注册与释放事件
//!
//! 所有事件都是同步通知，处理器返回错误时由触发方决定如何处理。

use crate::resolver::Resolver;
use crate::scope::ScopeResolver;
use ioc_common::{BoxError, Lifetime, ScopeInfo, TypeInfo};
use std::sync::Arc;

/// 组件注册前触发
#[derive(Debug, Clone)]
pub struct OnRegisteringEventArgs {
    pub implementation: TypeInfo,
    pub services: Vec<TypeInfo>,
    pub lifetime: Lifetime,
}

/// 约定注册一个程序集前触发
#[derive(Debug, Clone)]
pub struct OnConventionalRegisteringEventArgs {
    pub assembly: String,
    pub component_count: usize,
}

/// 根解析器构建前触发
#[derive(Debug, Clone)]
pub struct BeforeRegistrationCompletedEventArgs {
    pub registration_count: usize,
}

/// 根解析器构建完成后触发
pub struct RegistrationCompletedEventArgs<'a> {
    pub resolver: &'a dyn ScopeResolver,
}

/// 根解析器释放前触发，此时解析器仍然可用
pub struct OnDisposingEventArgs<'a> {
    pub resolver: &'a dyn Resolver,
    pub scope: &'a ScopeInfo,
}

pub type OnRegisteringHandler =
    Arc<dyn Fn(&OnRegisteringEventArgs) -> Result<(), BoxError> + Send + Sync>;

pub type OnConventionalRegisteringHandler =
    Arc<dyn Fn(&OnConventionalRegisteringEventArgs) -> Result<(), BoxError> + Send + Sync>;

pub type BeforeRegistrationCompletedHandler =
    Arc<dyn Fn(&BeforeRegistrationCompletedEventArgs) -> Result<(), BoxError> + Send + Sync>;

pub type RegistrationCompletedHandler =
    Arc<dyn Fn(&RegistrationCompletedEventArgs<'_>) -> Result<(), BoxError> + Send + Sync>;

pub type OnDisposingHandler =
    Arc<dyn Fn(&OnDisposingEventArgs<'_>) -> Result<(), BoxError> + Send + Sync>;
