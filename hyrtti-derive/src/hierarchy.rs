//! `Hierarchy` derive implementation.

use std::collections::HashMap;

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, Type, parse_macro_input};

pub fn derive_hierarchy(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_hierarchy_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// One variant of the identifier enum with its `#[hierarchy(...)]` settings.
struct Member {
    ident: Ident,
    ty: Type,
    parent: Option<Ident>,
    concrete: bool,
    object: Option<Type>,
}

impl Member {
    fn is_trait_object(&self) -> bool {
        matches!(self.ty, Type::TraitObject(_))
    }

    /// Instantiable struct of a concrete member.
    fn object_type(&self) -> &Type {
        self.object.as_ref().unwrap_or(&self.ty)
    }
}

fn derive_hierarchy_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Hierarchy derive does not support generic identifier enums",
        ));
    }

    let data = match &input.data {
        Data::Enum(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Hierarchy derive only supports enums",
            ));
        }
    };

    let mut members = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "identifier variants must be unit variants",
            ));
        }
        members.push(parse_member(&variant.ident, &variant.attrs)?);
    }

    let parents = check_tree(&members)?;
    let repr = repr_type(&input.attrs)?;

    let registrations = members.iter().map(|member| {
        let variant = &member.ident;
        let label = variant.to_string();
        let parent = match &member.parent {
            Some(parent) => quote!(::core::option::Option::Some(#name::#parent)),
            None => quote!(::core::option::Option::None),
        };
        let corporeality = if member.concrete {
            quote!(::hyrtti::Corporeality::Concrete)
        } else {
            quote!(::hyrtti::Corporeality::Abstract)
        };
        quote! { .register(#name::#variant, #parent, #corporeality, #label) }
    });

    let label = name.to_string();
    let mut expanded = quote! {
        impl ::hyrtti::HierarchyId for #name {
            const NAME: &'static str = #label;

            #[inline]
            fn to_raw(self) -> i64 {
                self as i64
            }

            #[inline]
            fn from_raw(raw: i64) -> ::core::option::Option<Self> {
                <#repr as ::core::convert::TryFrom<i64>>::try_from(raw)
                    .ok()
                    .and_then(Self::from_repr)
            }

            fn hierarchy() -> &'static ::hyrtti::Hierarchy<Self> {
                static HIERARCHY: ::hyrtti::__private::Lazy<::hyrtti::Hierarchy<#name>> =
                    ::hyrtti::__private::Lazy::new(|| {
                        ::hyrtti::HierarchyBuilder::new()
                            #(#registrations)*
                            .build()
                            .unwrap_or_else(|err| panic!("invalid hierarchy: {}", err))
                    });
                &HIERARCHY
            }
        }
    };

    for (at, member) in members.iter().enumerate() {
        let variant = &member.ident;
        let ty = &member.ty;

        let descendants: Vec<&Member> = members
            .iter()
            .enumerate()
            .filter(|(other, candidate)| candidate.concrete && descends(&parents, *other, at))
            .map(|(_, candidate)| candidate)
            .collect();
        let narrow = narrow_impl(name, ty, &descendants);

        expanded.extend(quote! {
            impl ::hyrtti::Variant for #ty {
                type Id = #name;
                const ID: #name = #name::#variant;
            }

            #narrow
        });

        if member.concrete {
            let object = member.object_type();
            expanded.extend(quote! {
                unsafe impl ::hyrtti::Tagged for #object {
                    type Id = #name;

                    #[inline]
                    fn rtti(&self) -> #name {
                        #name::#variant
                    }
                }

                impl ::hyrtti::Concrete for #object {
                    const ID: #name = #name::#variant;
                }
            });
        }
    }

    Ok(expanded)
}

fn narrow_impl(name: &Ident, ty: &Type, descendants: &[&Member]) -> TokenStream2 {
    let arms_ref = descendants.iter().map(|member| {
        let variant = &member.ident;
        let object = member.object_type();
        quote! {
            #name::#variant => {
                let narrowed: &'a Self = unsafe { &*object.cast::<#object>() };
                narrowed
            }
        }
    });
    let arms_mut = descendants.iter().map(|member| {
        let variant = &member.ident;
        let object = member.object_type();
        quote! {
            #name::#variant => {
                let narrowed: &'a mut Self = unsafe { &mut *object.cast::<#object>() };
                narrowed
            }
        }
    });
    let arms_box = descendants.iter().map(|member| {
        let variant = &member.ident;
        let object = member.object_type();
        quote! {
            #name::#variant => {
                let narrowed: ::std::boxed::Box<Self> =
                    unsafe { ::std::boxed::Box::from_raw(object.cast::<#object>()) };
                narrowed
            }
        }
    });

    quote! {
        unsafe impl ::hyrtti::Narrow for #ty {
            #[inline]
            #[allow(unreachable_patterns)]
            unsafe fn narrow_ref<'a>(object: *const (), actual: #name) -> &'a Self {
                match actual {
                    #(#arms_ref)*
                    _ => ::hyrtti::__private::invalid_narrow::<Self>(actual),
                }
            }

            #[inline]
            #[allow(unreachable_patterns)]
            unsafe fn narrow_mut<'a>(object: *mut (), actual: #name) -> &'a mut Self {
                match actual {
                    #(#arms_mut)*
                    _ => ::hyrtti::__private::invalid_narrow::<Self>(actual),
                }
            }

            #[allow(unreachable_patterns)]
            unsafe fn narrow_box(object: *mut (), actual: #name) -> ::std::boxed::Box<Self> {
                match actual {
                    #(#arms_box)*
                    _ => ::hyrtti::__private::invalid_narrow::<Self>(actual),
                }
            }
        }
    }
}

fn parse_member(ident: &Ident, attrs: &[Attribute]) -> syn::Result<Member> {
    let attr = attrs
        .iter()
        .find(|attr| attr.path().is_ident("hierarchy"))
        .ok_or_else(|| syn::Error::new_spanned(ident, "missing #[hierarchy(ty = ...)] attribute"))?;

    let mut ty = None;
    let mut parent = None;
    let mut concrete = false;
    let mut object = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("ty") {
            ty = Some(meta.value()?.parse::<Type>()?);
        } else if meta.path.is_ident("parent") {
            parent = Some(meta.value()?.parse::<Ident>()?);
        } else if meta.path.is_ident("object") {
            object = Some(meta.value()?.parse::<Type>()?);
        } else if meta.path.is_ident("concrete") {
            concrete = true;
        } else {
            return Err(meta.error("expected `ty`, `parent`, `object` or `concrete`"));
        }
        Ok(())
    })?;

    let ty = ty.ok_or_else(|| syn::Error::new_spanned(attr, "missing `ty = ...`"))?;
    let member = Member {
        ident: ident.clone(),
        ty,
        parent,
        concrete,
        object,
    };

    match (member.concrete, member.is_trait_object(), &member.object) {
        (false, false, _) => Err(syn::Error::new_spanned(
            &member.ty,
            "abstract variants must be represented by a trait object type",
        )),
        (false, true, Some(object)) => Err(syn::Error::new_spanned(
            object,
            "`object` only applies to concrete variants",
        )),
        (true, true, None) => Err(syn::Error::new_spanned(
            &member.ty,
            "concrete trait object variants must name their struct with `object = ...`",
        )),
        (true, false, Some(object)) => Err(syn::Error::new_spanned(
            object,
            "`object` only applies to trait object variants",
        )),
        _ => Ok(member),
    }
}

/// Resolve parent indices and reject unknown parents, missing or repeated roots, cycles and
/// struct-typed variants with children.
fn check_tree(members: &[Member]) -> syn::Result<Vec<Option<usize>>> {
    let positions: HashMap<String, usize> = members
        .iter()
        .enumerate()
        .map(|(at, member)| (member.ident.to_string(), at))
        .collect();

    let mut parents = Vec::with_capacity(members.len());
    for member in members {
        let parent = match &member.parent {
            Some(parent) => Some(*positions.get(&parent.to_string()).ok_or_else(|| {
                syn::Error::new_spanned(parent, format!("unknown parent variant `{parent}`"))
            })?),
            None => None,
        };
        parents.push(parent);
    }

    let roots: Vec<&Member> = members
        .iter()
        .zip(&parents)
        .filter(|(_, parent)| parent.is_none())
        .map(|(member, _)| member)
        .collect();
    match roots.as_slice() {
        [] => {
            return Err(syn::Error::new(
                Span::call_site(),
                "hierarchy has no root: exactly one variant must omit `parent`",
            ));
        }
        [_] => {}
        [_, extra, ..] => {
            return Err(syn::Error::new_spanned(
                &extra.ident,
                "hierarchy has several roots: exactly one variant must omit `parent`",
            ));
        }
    }

    for (at, member) in members.iter().enumerate() {
        if !reaches_root(&parents, at) {
            return Err(syn::Error::new_spanned(
                &member.ident,
                "parent chain of this variant forms a cycle",
            ));
        }
    }

    for (at, member) in members.iter().enumerate() {
        if member.is_trait_object() {
            continue;
        }
        if let Some(child) = parents.iter().position(|parent| *parent == Some(at)) {
            return Err(syn::Error::new_spanned(
                &members[child].ident,
                format!(
                    "`{}` is represented by a struct and cannot have children; use a trait object type with `object = ...`",
                    member.ident
                ),
            ));
        }
    }

    Ok(parents)
}

fn reaches_root(parents: &[Option<usize>], mut at: usize) -> bool {
    for _ in 0..=parents.len() {
        match parents[at] {
            Some(parent) => at = parent,
            None => return true,
        }
    }
    false
}

/// Whether `actual` is `test` or one of its descendants.
fn descends(parents: &[Option<usize>], actual: usize, test: usize) -> bool {
    let mut current = Some(actual);
    while let Some(at) = current {
        if at == test {
            return true;
        }
        current = parents[at];
    }
    false
}

/// Integer type of `#[repr(...)]`, which is also the argument type of strum's `from_repr`.
fn repr_type(attrs: &[Attribute]) -> syn::Result<Type> {
    const INTEGERS: [&str; 12] = [
        "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128", "isize",
    ];

    let mut repr = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("repr")) {
        attr.parse_nested_meta(|meta| {
            if let Some(ident) = meta.path.get_ident() {
                if INTEGERS.contains(&ident.to_string().as_str()) {
                    repr = Some(ident.clone());
                }
            }
            Ok(())
        })?;
    }

    let repr = repr.unwrap_or_else(|| Ident::new("usize", Span::call_site()));
    Ok(syn::parse_quote!(#repr))
}
