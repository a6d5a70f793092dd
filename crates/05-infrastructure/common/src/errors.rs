//! 错误类型定义

use thiserror::Error;

/// 事件处理器和组件回调使用的装箱错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError { source: BoxError },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件未注册: {type_name}")]
    ComponentNotRegistered { type_name: String },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ComponentCreationFailed { type_name: String, source: BoxError },

    #[error("依赖解析失败: {type_name}, 原因: {message}")]
    DependencyResolutionFailed { type_name: String, message: String },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("模块已注册: {module_name}")]
    DuplicateModule { module_name: String },

    #[error("模块未注册: {module_name}")]
    ModuleNotRegistered { module_name: String },

    #[error("对象已释放: {object_name}")]
    ObjectDisposed { object_name: String },

    #[error("必需参数缺失: {argument_name}")]
    ArgumentNull { argument_name: String },

    #[error("类型不匹配: 期望 {expected}, 实际 {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("组件注册失败: {type_name}, 原因: {message}")]
    RegistrationError { type_name: String, message: String },

    #[error("生命周期事件处理失败: {message}")]
    LifecycleError { message: String },

    #[error("释放过程中出现 {} 个错误: {}", .errors.len(), .errors.join("; "))]
    DisposalFailed { errors: Vec<String> },
}

impl DependencyError {
    /// 创建未注册错误
    pub fn not_registered(type_name: impl Into<String>) -> Self {
        Self::ComponentNotRegistered {
            type_name: type_name.into(),
        }
    }

    /// 创建对象已释放错误
    pub fn disposed(object_name: impl Into<String>) -> Self {
        Self::ObjectDisposed {
            object_name: object_name.into(),
        }
    }

    /// 创建依赖解析失败错误
    pub fn resolution_failed(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DependencyResolutionFailed {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// 创建注册失败错误
    pub fn registration(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RegistrationError {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// 是否为未注册错误
    pub fn is_not_registered(&self) -> bool {
        matches!(self, Self::ComponentNotRegistered { .. })
    }

    /// 是否为对象已释放错误
    pub fn is_disposed(&self) -> bool {
        matches!(self, Self::ObjectDisposed { .. })
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
