//! # wirejson Derive Macros
//!
//! This crate provides `#[derive(Reflect)]` for `wirejson`.
//!
//! * **Structs with named fields** get `Reflect` (classifying as a composite), `Object` (the
//!   member schema: one entry per field plus any declared accessors) and `FromJson` (read
//!   through the schema). The struct must implement `Default`.
//! * **Fieldless enums** get `Reflect` (classifying as their ordinal), `FromToken` and
//!   `FromJson` (by ordinal or by variant name).
//!
//! ## Attributes
//!
//! | Attribute | On | Effect |
//! |---|---|---|
//! | `#[reflect(skip)]` | field | not a member |
//! | `#[reflect(rename = "wire")]` | field | member name on the wire |
//! | `#[reflect(accessor(name = "n", ty = "T", get = "m", set = "m"))]` | struct | accessor member; `set` optional |
//!
//! Compatible with `syn 2.0`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Type};

/// Derives `Reflect`, plus `Object`/`FromJson` for structs or `FromToken`/`FromJson` for enums.
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &input.generics,
            "Reflect cannot be derived for generic types; implement `Object` by hand",
        )
        .to_compile_error()
        .into();
    }

    let expanded = match &input.data {
        Data::Struct(data) => expand_struct(&input.ident, &input.attrs, &data.fields),
        Data::Enum(data) => expand_enum(&input.ident, data),
        Data::Union(_) => Err(syn::Error::new(
            input.ident.span(),
            "Reflect does not support unions",
        )),
    };

    match expanded {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

// --- Attributes ---

#[derive(Default)]
struct FieldOptions {
    skip: bool,
    rename: Option<String>,
}

struct Accessor {
    name: LitStr,
    ty: Type,
    get: Ident,
    set: Option<Ident>,
}

fn parse_field_attributes(attrs: &[Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                return Ok(());
            }
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                options.rename = Some(value.value());
                return Ok(());
            }
            Err(meta.error("unknown reflect field attribute. Supported: skip, rename"))
        })?;
    }
    Ok(options)
}

fn parse_container_attributes(attrs: &[Attribute]) -> syn::Result<Vec<Accessor>> {
    let mut accessors = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("accessor") {
                return Err(meta.error("unknown reflect attribute. Supported: accessor(..)"));
            }

            let mut name = None;
            let mut ty = None;
            let mut get = None;
            let mut set = None;
            meta.parse_nested_meta(|inner| {
                let value: LitStr = inner.value()?.parse()?;
                if inner.path.is_ident("name") {
                    name = Some(value);
                } else if inner.path.is_ident("ty") {
                    ty = Some(value.parse::<Type>()?);
                } else if inner.path.is_ident("get") {
                    get = Some(value.parse::<Ident>()?);
                } else if inner.path.is_ident("set") {
                    set = Some(value.parse::<Ident>()?);
                } else {
                    return Err(inner.error("unknown accessor key. Supported: name, ty, get, set"));
                }
                Ok(())
            })?;

            accessors.push(Accessor {
                name: name.ok_or_else(|| meta.error("accessor requires `name`"))?,
                ty: ty.ok_or_else(|| meta.error("accessor requires `ty`"))?,
                get: get.ok_or_else(|| meta.error("accessor requires `get`"))?,
                set,
            });
            Ok(())
        })?;
    }
    Ok(accessors)
}

// --- Structs ---

fn expand_struct(name: &Ident, attrs: &[Attribute], fields: &Fields) -> syn::Result<TokenStream2> {
    let named = match fields {
        Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new(
                name.span(),
                "Reflect requires named fields; tuple structs have no member names",
            ));
        }
    };

    let mut members = Vec::new();

    for field in named {
        let options = parse_field_attributes(&field.attrs)?;
        if options.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let wire = options.rename.unwrap_or_else(|| ident.unraw().to_string());

        members.push(quote! {
            .field::<#ty>(
                #wire,
                |this, f| f(&this.#ident),
                |this, incoming| {
                    this.#ident = <#ty as wirejson::rt::FromJson>::from_incoming(incoming)?;
                    ::core::result::Result::Ok(())
                },
            )
        });
    }

    for accessor in parse_container_attributes(attrs)? {
        let Accessor { name: wire, ty, get, set } = accessor;
        let set_expr = match set {
            Some(set) => quote! {
                wirejson::rt::setter::<Self>(|this, incoming| {
                    this.#set(<#ty as wirejson::rt::FromJson>::from_incoming(incoming)?);
                    ::core::result::Result::Ok(())
                })
            },
            None => quote! { ::core::option::Option::None },
        };

        members.push(quote! {
            .accessor::<#ty>(#wire, |this, f| f(&this.#get()), #set_expr)
        });
    }

    Ok(quote! {
        impl wirejson::rt::Reflect for #name {
            fn reflect(&self, visit: &mut wirejson::rt::Visit<'_>) -> wirejson::rt::Result<()> {
                visit(wirejson::rt::ValueRef::Composite(self))
            }

            fn declared_tag() -> ::core::option::Option<wirejson::rt::Tag> {
                ::core::option::Option::Some(wirejson::rt::Tag::Composite)
            }
        }

        impl wirejson::rt::Object for #name {
            fn describe() -> wirejson::rt::MemberSchema<Self> {
                wirejson::rt::MemberSchema::<Self>::builder()
                    #(#members)*
                    .build()
            }
        }

        impl wirejson::rt::FromJson for #name {
            fn from_object(parser: &mut wirejson::rt::Parser<'_>) -> wirejson::rt::Result<Self> {
                parser.read_object::<Self>()
            }

            fn null_value() -> wirejson::rt::Result<Self> {
                ::core::result::Result::Ok(<Self as ::core::default::Default>::default())
            }
        }
    })
}

// --- Enums ---

fn expand_enum(name: &Ident, data: &syn::DataEnum) -> syn::Result<TokenStream2> {
    if data.variants.is_empty() {
        return Err(syn::Error::new(
            name.span(),
            "Reflect cannot be derived for an enum without variants",
        ));
    }

    let mut idents = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Reflect only supports fieldless enums",
            ));
        }
        idents.push(&variant.ident);
    }
    let names = idents.iter().map(|i| i.unraw().to_string());

    Ok(quote! {
        impl wirejson::rt::Reflect for #name {
            fn reflect(&self, visit: &mut wirejson::rt::Visit<'_>) -> wirejson::rt::Result<()> {
                let ordinal: i64 = match self {
                    #(Self::#idents => Self::#idents as i64,)*
                };
                visit(wirejson::rt::ValueRef::Enum(ordinal))
            }

            fn declared_tag() -> ::core::option::Option<wirejson::rt::Tag> {
                ::core::option::Option::Some(wirejson::rt::Tag::Enum)
            }
        }

        impl wirejson::rt::FromToken for #name {
            fn from_token(token: &str) -> wirejson::rt::Result<Self> {
                const VARIANTS: &[(&str, i64)] = &[#((#names, #name::#idents as i64)),*];
                match wirejson::rt::enum_ordinal(token, VARIANTS) {
                    #(::core::option::Option::Some(ordinal) if ordinal == Self::#idents as i64 => {
                        ::core::result::Result::Ok(Self::#idents)
                    })*
                    _ => ::core::result::Result::Err(wirejson::rt::JsonError::conversion::<Self>(token)),
                }
            }
        }

        impl wirejson::rt::FromJson for #name {
            fn from_literal(literal: &wirejson::rt::Literal<'_>) -> wirejson::rt::Result<Self> {
                <Self as wirejson::rt::FromToken>::from_token(literal.text())
            }

            fn null_value() -> wirejson::rt::Result<Self> {
                <Self as wirejson::rt::FromToken>::from_token("0")
                    .map_err(|_| wirejson::rt::JsonError::conversion::<Self>("null"))
            }
        }
    })
}
