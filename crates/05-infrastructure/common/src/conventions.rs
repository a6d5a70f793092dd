//! 约定规范定义
//!
//! 约定注册时，实现类型只以"默认接口"对外暴露：接口名去掉 `I` 前缀后的词干
//! 必须出现在实现类型名称中，例如 `ConsoleGreeter` 的默认接口是 `IGreeter`。
//! 这是一个基于名称的启发式规则，名称相近但无关的类型可能被误判，
//! 组件自身声明的服务列表才是准确的映射。

use crate::metadata::TypeInfo;

/// 命名约定规范
#[derive(Debug)]
pub struct NamingConventions;

impl NamingConventions {
    /// 获取接口词干：`IGreeter` -> `Greeter`，`Greeter` -> `Greeter`
    pub fn interface_stem(interface_name: &str) -> &str {
        let mut chars = interface_name.chars();
        match (chars.next(), chars.next()) {
            (Some('I'), Some(second)) if second.is_uppercase() => &interface_name[1..],
            _ => interface_name,
        }
    }

    /// 检查服务类型是否为实现类型的默认接口
    pub fn is_default_interface(implementation: &TypeInfo, service: &TypeInfo) -> bool {
        if implementation.id == service.id {
            return false;
        }
        let stem = Self::interface_stem(service.short_name());
        !stem.is_empty() && implementation.short_name().contains(stem)
    }

    /// 从候选服务中筛选默认接口，保持声明顺序
    pub fn default_interfaces(implementation: &TypeInfo, candidates: &[TypeInfo]) -> Vec<TypeInfo> {
        candidates
            .iter()
            .filter(|candidate| Self::is_default_interface(implementation, candidate))
            .copied()
            .collect()
    }
}
