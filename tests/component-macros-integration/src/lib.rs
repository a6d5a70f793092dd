//! 组件宏集成测试共用的服务接口

/// 按默认接口约定注册的服务
pub trait IAlphaService: Send + Sync {
    fn kind(&self) -> &'static str;
}

pub trait IBetaService: Send + Sync {
    fn kind(&self) -> &'static str;
}

pub trait IGammaService: Send + Sync {
    fn kind(&self) -> &'static str;
}

/// 不符合默认接口约定的服务，约定注册时不暴露
pub trait IAuditable: Send + Sync {
    fn audit_key(&self) -> String;
}

/// 可启动组件的记录
pub trait IStartupLog: Send + Sync {
    fn record(&self, entry: &str);
    fn entries(&self) -> Vec<String>;
}
