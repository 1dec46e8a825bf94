//! `DynUnion` derive implementation.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, Type, parse_macro_input};

pub fn derive_dyn_union(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_dyn_union_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct Settings {
    base: Type,
    clone: bool,
}

fn derive_dyn_union_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "DynUnion derive does not support generic unions",
        ));
    }

    let data = match &input.data {
        Data::Enum(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "DynUnion derive only supports enums",
            ));
        }
    };

    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            input,
            "a union needs at least one alternative",
        ));
    }

    let mut alternatives: Vec<(&Ident, &Type)> = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        match &variant.fields {
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                alternatives.push((&variant.ident, &fields.unnamed[0].ty));
            }
            _ => {
                return Err(syn::Error::new_spanned(
                    variant,
                    "union alternatives must be tuple variants holding exactly one value",
                ));
            }
        }
    }

    let Settings { base, clone } = parse_settings(input)?;
    let variants: Vec<&Ident> = alternatives.iter().map(|(variant, _)| *variant).collect();
    let types: Vec<&Type> = alternatives.iter().map(|(_, ty)| *ty).collect();

    let mut expanded = quote! {
        impl ::hyrtti::DynUnion for #name {
            type Id = <#base as ::hyrtti::Variant>::Id;
            type Base = #base;

            #[inline]
            fn base(&self) -> &Self::Base {
                match self {
                    #(Self::#variants(value) => {
                        let base: &Self::Base = value;
                        base
                    })*
                }
            }

            #[inline]
            fn base_mut(&mut self) -> &mut Self::Base {
                match self {
                    #(Self::#variants(value) => {
                        let base: &mut Self::Base = value;
                        base
                    })*
                }
            }

            fn alternatives() -> &'static [Self::Id] {
                const ALTERNATIVES: &[<#base as ::hyrtti::Variant>::Id] =
                    &[#(<#types as ::hyrtti::Concrete>::ID),*];
                ALTERNATIVES
            }
        }

        #(
            impl ::core::convert::From<#types> for #name {
                #[inline]
                fn from(value: #types) -> Self {
                    Self::#variants(value)
                }
            }
        )*
    };

    if clone {
        expanded.extend(quote! {
            impl ::core::clone::Clone for #name {
                fn clone(&self) -> Self {
                    match self {
                        #(Self::#variants(value) => Self::#variants(::core::clone::Clone::clone(value)),)*
                    }
                }

                #[allow(unreachable_patterns)]
                fn clone_from(&mut self, source: &Self) {
                    match (&mut *self, source) {
                        #((Self::#variants(target), Self::#variants(value)) => {
                            ::core::clone::Clone::clone_from(target, value)
                        })*
                        (target, source) => *target = ::core::clone::Clone::clone(source),
                    }
                }
            }
        });
    }

    Ok(expanded)
}

fn parse_settings(input: &DeriveInput) -> syn::Result<Settings> {
    let attr = input
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("dyn_union"))
        .ok_or_else(|| {
            syn::Error::new_spanned(&input.ident, "missing #[dyn_union(base = ...)] attribute")
        })?;

    let mut base = None;
    let mut clone = false;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("base") {
            base = Some(meta.value()?.parse::<Type>()?);
        } else if meta.path.is_ident("clone") {
            clone = true;
        } else {
            return Err(meta.error("expected `base` or `clone`"));
        }
        Ok(())
    })?;

    let base = base.ok_or_else(|| syn::Error::new_spanned(attr, "missing `base = ...`"))?;
    Ok(Settings { base, clone })
}
