//! 元数据定义
//!
//! 提供服务和实现类型的元数据信息

use std::any::TypeId;

/// 类型信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称，例如 `dyn app::greeting::IGreeter`
    pub full_name: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息，支持 `dyn Trait`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            full_name: std::any::type_name::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含 `dyn`、模块路径、泛型参数和附加约束）
    pub fn short_name(&self) -> &'static str {
        let name = self.full_name.trim_start_matches("dyn ");
        let name = name.split(" + ").next().unwrap_or(name);
        let name = name.split('<').next().unwrap_or(name);
        name.rsplit("::").next().unwrap_or(name)
    }

    /// 是否为 trait object 类型
    pub fn is_trait_object(&self) -> bool {
        self.full_name.starts_with("dyn ")
    }
}

impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.full_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait IGreeter {}

    struct ConsoleGreeter;

    struct Wrapper<T>(T);

    #[test]
    fn test_short_name_strips_dyn_and_path() {
        let info = TypeInfo::of::<dyn IGreeter + Send + Sync>();

        assert_eq!(info.short_name(), "IGreeter");
        assert!(info.is_trait_object());
    }

    #[test]
    fn test_short_name_strips_generic_arguments() {
        assert_eq!(TypeInfo::of::<Wrapper<ConsoleGreeter>>().short_name(), "Wrapper");
        assert_eq!(TypeInfo::of::<ConsoleGreeter>().short_name(), "ConsoleGreeter");
    }

    #[test]
    fn test_type_info_equality_follows_type_id() {
        assert_eq!(TypeInfo::of::<ConsoleGreeter>(), TypeInfo::of::<ConsoleGreeter>());
        assert_ne!(
            TypeInfo::of::<ConsoleGreeter>(),
            TypeInfo::of::<dyn IGreeter>()
        );
    }
}
