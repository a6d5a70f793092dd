//! 解析参数
//!
//! 解析时附带的额外构造参数。参数按类型匹配，同类型的多个参数中第一个生效。

use ioc_common::TypeInfo;
use std::any::Any;
use std::sync::Arc;

/// 单个类型化参数
#[derive(Clone)]
struct Argument {
    type_info: TypeInfo,
    value: Arc<dyn Any + Send + Sync>,
}

/// 有序的类型化参数集合
#[derive(Clone, Default)]
pub struct Arguments {
    entries: Vec<Argument>,
}

impl Arguments {
    /// 创建空的参数集合
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 共享的空参数集合
    pub fn empty() -> &'static Arguments {
        static EMPTY: Arguments = Arguments::new();
        &EMPTY
    }

    /// 追加参数（构建器风格）
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    /// 追加参数
    pub fn push<T: Send + Sync + 'static>(&mut self, value: T) {
        self.entries.push(Argument {
            type_info: TypeInfo::of::<T>(),
            value: Arc::new(value),
        });
    }

    /// 按类型获取第一个匹配的参数
    pub fn get<T: Clone + 'static>(&self) -> Option<T> {
        self.entries
            .iter()
            .find_map(|argument| argument.value.downcast_ref::<T>())
            .cloned()
    }

    /// 是否包含指定类型的参数
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.iter().any(|argument| argument.value.is::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 参数类型列表，按传入顺序
    pub fn types(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        self.entries.iter().map(|argument| argument.type_info)
    }
}

impl std::fmt::Debug for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|argument| argument.type_info.full_name))
            .finish()
    }
}

/// 可转换为参数集合的类型
///
/// 元组中的每个元素依次成为一个参数：`("db".to_string(), 5u32)`。
pub trait IntoArguments {
    fn into_arguments(self) -> Arguments;
}

impl IntoArguments for Arguments {
    fn into_arguments(self) -> Arguments {
        self
    }
}

impl IntoArguments for &Arguments {
    fn into_arguments(self) -> Arguments {
        self.clone()
    }
}

impl IntoArguments for () {
    fn into_arguments(self) -> Arguments {
        Arguments::new()
    }
}

macro_rules! tuple_arguments {
    ($($name:ident),+) => {
        impl<$($name),+> IntoArguments for ($($name,)+)
        where
            $($name: Send + Sync + 'static),+
        {
            #[allow(non_snake_case)]
            fn into_arguments(self) -> Arguments {
                let ($($name,)+) = self;
                Arguments::new()$(.with($name))+
            }
        }
    };
}

tuple_arguments!(A);
tuple_arguments!(A, B);
tuple_arguments!(A, B, C);
tuple_arguments!(A, B, C, D);
tuple_arguments!(A, B, C, D, E);
