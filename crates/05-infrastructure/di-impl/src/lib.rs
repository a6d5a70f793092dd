//! # 依赖注入具体实现
//!
//! 提供装饰器注册表、组件注册表、生命周期作用域、根解析器、服务注册门面
//! 以及可释放对象包装器的具体实现。
//!
//! ```ignore
//! let mut registration = ServiceRegistrationImpl::new();
//! registration
//!     .register::<dyn IGreeter, ConsoleGreeter>(Lifetime::Singleton, false)?
//!     .decorate::<dyn IGreeter, _>(|_ctx, inner| Ok(Arc::new(LoudGreeter { inner })));
//! let root = registration.create_resolver()?;
//! let greeter = root.resolve::<dyn IGreeter>()?;
//! ```

pub mod config;
pub mod container;
pub mod decorator;
pub mod registration;
pub mod root;
pub mod scope;
pub mod wrapper;

pub use config::{ContainerConfig, DisposalPolicy, ENVIRONMENT_PREFIX};
pub use container::{ComponentRegistry, Container};
pub use decorator::DecoratorRegistry;
pub use registration::ServiceRegistrationImpl;
pub use root::RootScope;
pub use scope::LifetimeScope;
pub use wrapper::DisposableObjectWrapper;
