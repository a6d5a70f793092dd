//! 容器配置

use di_abstractions::DEFAULT_MAX_RESOLUTION_DEPTH;
use ioc_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error};

/// 环境变量前缀，例如 `IOC_MAX_RESOLUTION_DEPTH=32`
pub const ENVIRONMENT_PREFIX: &str = "IOC";

/// 根解析器释放时，释放通知处理器失败的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisposalPolicy {
    /// 执行全部处理器，始终释放作用域链和容器，最后汇总返回错误
    #[default]
    Finally,
    /// 第一个失败的处理器终止释放流程，根解析器标记为已释放但不释放任何实例
    AbortOnError,
}

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 释放失败策略
    pub disposal_policy: DisposalPolicy,
    /// 构建后是否跳过可启动组件
    pub ignore_startable_components: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
            disposal_policy: DisposalPolicy::Finally,
            ignore_startable_components: false,
        }
    }
}

impl ContainerConfig {
    /// 从配置文件加载，支持 TOML / JSON / YAML，环境变量优先
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        debug!("加载容器配置: {}", path.display());

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix(ENVIRONMENT_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| {
                error!("容器配置构建失败: {}", e);
                ConfigError::ParseError { source: Box::new(e) }
            })?;

        Self::from_settings(settings)
    }

    /// 只从环境变量加载
    pub fn from_env() -> ConfigResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENVIRONMENT_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| ConfigError::ParseError { source: Box::new(e) })?;

        Self::from_settings(settings)
    }

    fn from_settings(settings: config::Config) -> ConfigResult<Self> {
        let config: Self = settings.try_deserialize().map_err(|e| {
            error!("容器配置绑定失败: {}", e);
            ConfigError::ParseError { source: Box::new(e) }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_resolution_depth 必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_disposal_policy(mut self, policy: DisposalPolicy) -> Self {
        self.disposal_policy = policy;
        self
    }

    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    pub fn ignoring_startable_components(mut self) -> Self {
        self.ignore_startable_components = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ContainerConfig::default();

        assert_eq!(config.max_resolution_depth, 64);
        assert_eq!(config.disposal_policy, DisposalPolicy::Finally);
        assert!(!config.ignore_startable_components);
    }

    #[test]
    fn test_load_toml_with_partial_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "max_resolution_depth = 16").unwrap();
        writeln!(file, "disposal_policy = \"abort_on_error\"").unwrap();

        let config = ContainerConfig::load(file.path()).unwrap();

        assert_eq!(config.max_resolution_depth, 16);
        assert_eq!(config.disposal_policy, DisposalPolicy::AbortOnError);
        assert!(!config.ignore_startable_components);
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"ignore_startable_components": true}}"#).unwrap();

        let config = ContainerConfig::load(file.path()).unwrap();

        assert!(config.ignore_startable_components);
        assert_eq!(config.max_resolution_depth, 64);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();

        let error = ContainerConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(error, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_zero_depth_fails_validation() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "max_resolution_depth = 0").unwrap();

        let error = ContainerConfig::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::ValidationError { .. }));
    }
}
