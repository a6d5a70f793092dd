//! 日志初始化

use tracing::{debug, info};

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
    /// 过滤指令，例如 `di_impl=debug,info`，优先于 `level`
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
            filter: None,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
            filter: None,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
            filter: None,
        }
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_json_format(mut self, json_format: bool) -> Self {
        self.json_format = json_format;
        self
    }

    /// 安装全局日志订阅者
    ///
    /// 返回是否由本次调用完成安装；已存在全局订阅者时返回 `false`。
    pub fn initialize(&self) -> bool {
        let filter = tracing_subscriber::EnvFilter::try_new(
            self.filter.clone().unwrap_or_else(|| self.level.to_string()),
        )
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(self.level.to_string()));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        let result = if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        };

        match result {
            Ok(()) => {
                info!("日志系统初始化完成");
                true
            }
            Err(e) => {
                debug!("日志系统已初始化，跳过: {}", e);
                false
            }
        }
    }
}
