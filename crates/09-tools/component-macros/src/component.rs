//! 约定注册宏实现

use crate::utils::to_snake_case;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, punctuated::Punctuated, Error, Ident, ItemStruct, Result,
    Token, Type,
};

/// 组件配置参数
#[derive(Debug, Clone)]
pub struct ComponentArgs {
    /// 生命周期类型
    pub lifetime: ComponentLifetime,
    /// 声明的服务
    pub services: Vec<Type>,
    /// 是否可启动
    pub startable: bool,
}

/// 组件生命周期类型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentLifetime {
    Singleton,
    Scoped,
    Transient,
}

impl Default for ComponentArgs {
    fn default() -> Self {
        Self {
            lifetime: ComponentLifetime::Transient,
            services: Vec::new(),
            startable: false,
        }
    }
}

impl Parse for ComponentArgs {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        let mut args = ComponentArgs::default();
        let mut lifetime_span: Option<Span> = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            let lifetime = match ident.to_string().as_str() {
                "singleton" => Some(ComponentLifetime::Singleton),
                "scoped" => Some(ComponentLifetime::Scoped),
                "transient" => Some(ComponentLifetime::Transient),
                "startable" => {
                    args.startable = true;
                    None
                }
                "services" => {
                    let content;
                    syn::parenthesized!(content in input);
                    let services = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
                    args.services.extend(services);
                    None
                }
                other => {
                    return Err(Error::new(
                        ident.span(),
                        format!("未知的 component 参数: `{}`", other),
                    ))
                }
            };

            if let Some(lifetime) = lifetime {
                if lifetime_span.is_some() {
                    return Err(Error::new(ident.span(), "生命周期只能声明一次"));
                }
                lifetime_span = Some(ident.span());
                args.lifetime = lifetime;
            }

            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }

        Ok(args)
    }
}

/// 实现 #[component] 宏
pub fn component_impl(args: TokenStream, input_struct: ItemStruct) -> Result<TokenStream> {
    let component_args: ComponentArgs = syn::parse2(args)?;

    if !input_struct.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input_struct.generics,
            "泛型结构体不能进行约定注册",
        ));
    }

    let struct_name = &input_struct.ident;
    let marker_impl = generate_marker_impl(struct_name, component_args.lifetime);

    let services = &component_args.services;
    let implements_impl = if services.is_empty() {
        quote! {}
    } else {
        quote! {
            ::di_abstractions::implements!(#struct_name => #(#services),*);
        }
    };

    let registration_code = generate_registration_code(struct_name, &component_args);

    Ok(quote! {
        #input_struct

        #marker_impl

        #implements_impl

        #registration_code
    })
}

/// 生成生命周期标记 trait 实现
fn generate_marker_impl(struct_name: &Ident, lifetime: ComponentLifetime) -> TokenStream {
    let (variant, marker) = match lifetime {
        ComponentLifetime::Singleton => (quote! { Singleton }, quote! { SingletonDependency }),
        ComponentLifetime::Scoped => (quote! { LifetimeScope }, quote! { LifetimeScopeDependency }),
        ComponentLifetime::Transient => (quote! { Transient }, quote! { TransientDependency }),
    };

    quote! {
        impl ::di_abstractions::__private::LifecycleMarker for #struct_name {
            const LIFETIME: ::di_abstractions::__private::Lifetime =
                ::di_abstractions::__private::Lifetime::#variant;
        }

        impl ::di_abstractions::__private::#marker for #struct_name {}
    }
}

/// 生成约定目录登记代码
fn generate_registration_code(struct_name: &Ident, args: &ComponentArgs) -> TokenStream {
    let registration_fn_name = Ident::new(
        &format!("__register_component_{}", to_snake_case(&struct_name.to_string())),
        Span::call_site(),
    );

    let services = &args.services;
    let startable = if args.startable {
        quote! { .startable() }
    } else {
        quote! {}
    };

    quote! {
        // 使用 ctor 在程序启动时登记组件
        #[::di_abstractions::__private::ctor]
        #[allow(non_snake_case)]
        fn #registration_fn_name() {
            ::di_abstractions::submit_component(env!("CARGO_PKG_NAME"), || {
                ::di_abstractions::ConventionalComponent::new::<#struct_name>(|component| {
                    component #(.as_service::<#services>())* #startable
                })
            });
        }
    }
}
