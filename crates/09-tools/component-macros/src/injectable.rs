//! 属性注入派生宏实现

use crate::utils::{extract_generic_type, field_has_attribute, is_type_named};
use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Field, Fields, Ident, LitStr, Result, Type};

/// 字段的注入方式
#[derive(Debug, Clone, PartialEq)]
pub enum Injection {
    /// `Arc<T>`：必需依赖
    Required(Type),
    /// `Option<Arc<T>>`：可选依赖
    Optional(Type),
    /// `Vec<Arc<T>>`：全部实现
    All(Type),
    /// `#[inject(arg)]`：解析参数
    Argument,
    /// `#[do_not_inject]` 或无法注入的类型
    Default,
}

impl Injection {
    /// 按字段属性和类型确定注入方式
    pub fn of(field: &Field) -> Result<Self> {
        if field_has_attribute(field, "do_not_inject") {
            return Ok(Self::Default);
        }
        if let Some(attr) = field.attrs.iter().find(|attr| attr.path().is_ident("inject")) {
            let mut argument = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("arg") {
                    argument = true;
                    Ok(())
                } else {
                    Err(meta.error("未知的 inject 参数"))
                }
            })?;
            if argument {
                return Ok(Self::Argument);
            }
        }
        Ok(Self::from_type(&field.ty))
    }

    fn from_type(ty: &Type) -> Self {
        if let Some(service) = arc_inner(ty) {
            return Self::Required(service.clone());
        }
        if is_type_named(ty, "Option") {
            if let Some(service) = extract_generic_type(ty).and_then(arc_inner) {
                return Self::Optional(service.clone());
            }
        }
        if is_type_named(ty, "Vec") {
            if let Some(service) = extract_generic_type(ty).and_then(arc_inner) {
                return Self::All(service.clone());
            }
        }
        Self::Default
    }

    fn expression(&self, field: &Field) -> TokenStream {
        let ty = &field.ty;
        match self {
            Self::Required(service) => quote_spanned! {ty.span()=> ctx.resolve::<#service>()? },
            Self::Optional(service) => quote_spanned! {ty.span()=> ctx.try_resolve::<#service>()? },
            Self::All(service) => quote_spanned! {ty.span()=> ctx.resolve_all::<#service>()? },
            Self::Argument => quote_spanned! {ty.span()=> ctx.argument::<#ty>()? },
            Self::Default => quote_spanned! {ty.span()=> ::core::default::Default::default() },
        }
    }
}

/// `Arc<T>` 的 `T`
fn arc_inner(ty: &Type) -> Option<&Type> {
    if is_type_named(ty, "Arc") {
        extract_generic_type(ty)
    } else {
        None
    }
}

/// 解析 `#[injectable(release = "method")]`
fn release_method(input: &DeriveInput) -> Result<Option<Ident>> {
    let mut release = None;
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("injectable")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("release") {
                let method: LitStr = meta.value()?.parse()?;
                release = Some(method.parse::<Ident>()?);
                Ok(())
            } else {
                Err(meta.error("未知的 injectable 参数"))
            }
        })?;
    }
    Ok(release)
}

/// 实现 #[derive(Injectable)] 宏
pub fn derive_injectable_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(Error::new_spanned(
                struct_name,
                "Injectable 只能派生在结构体上",
            ))
        }
    };

    let construct = match fields {
        Fields::Named(named) => {
            let values = named
                .named
                .iter()
                .map(|field| {
                    let name = &field.ident;
                    let value = Injection::of(field)?.expression(field);
                    Ok(quote! { #name: #value })
                })
                .collect::<Result<Vec<_>>>()?;
            quote! { Self { #(#values),* } }
        }
        Fields::Unnamed(unnamed) => {
            let values = unnamed
                .unnamed
                .iter()
                .map(|field| Ok(Injection::of(field)?.expression(field)))
                .collect::<Result<Vec<_>>>()?;
            quote! { Self(#(#values),*) }
        }
        Fields::Unit => quote! { Self },
    };

    let release = release_method(&input)?.map(|method| {
        quote! {
            const NEEDS_RELEASE: bool = true;

            fn release(&self) {
                self.#method();
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::di_abstractions::Injectable for #struct_name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn inject(
                ctx: &::di_abstractions::ResolverContext<'_>,
            ) -> ::core::result::Result<Self, ::di_abstractions::DependencyError> {
                ::core::result::Result::Ok(#construct)
            }

            #release
        }
    })
}
