//! Derive macros for hyrtti.
//!
//! - `#[derive(Hierarchy)]` registers a closed hierarchy from its identifier enum.
//! - `#[derive(DynUnion)]` turns an enum of concrete alternatives into a tagged union.

mod hierarchy;
mod union;

use proc_macro::TokenStream;

/// Derive `HierarchyId` and the per-member cast traits for an identifier enum.
///
/// Every variant carries a `#[hierarchy(...)]` attribute:
///
/// - `ty = <type>`: the Rust type standing for the member. Abstract members and concrete
///   members with children use a trait object (`dyn Mammal`), concrete leaves their struct.
/// - `parent = <variant>`: the parent member; omitted for the single root.
/// - `concrete`: the member is instantiable (members are abstract by default).
/// - `object = <type>`: for concrete trait-object members, the instantiable struct.
///
/// The enum must also derive `strum::FromRepr`, which provides the validity oracle.
///
/// ```text
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Hierarchy)]
/// #[repr(u8)]
/// pub enum AnimalId {
///     #[hierarchy(ty = dyn Animal)]
///     Animal,
///     #[hierarchy(ty = dyn Mammal, parent = Animal)]
///     Mammal,
///     #[hierarchy(ty = Cat, parent = Mammal, concrete)]
///     Cat,
/// }
/// ```
#[proc_macro_derive(Hierarchy, attributes(hierarchy))]
pub fn derive_hierarchy(input: TokenStream) -> TokenStream {
    hierarchy::derive_hierarchy(input)
}

/// Derive `DynUnion` (and `From` for each alternative) for an enum whose variants each hold
/// one concrete struct of a sub-hierarchy.
///
/// The enum carries `#[dyn_union(base = <type>)]`, naming the common ancestor of the
/// alternatives; adding `clone` also derives a `Clone` whose `clone_from` reuses the target
/// alternative when the active types match.
///
/// ```text
/// #[derive(DynUnion)]
/// #[dyn_union(base = dyn Cetacea, clone)]
/// pub enum Pod {
///     Whale(Whale),
///     Dolphin(Dolphin),
/// }
/// ```
#[proc_macro_derive(DynUnion, attributes(dyn_union))]
pub fn derive_dyn_union(input: TokenStream) -> TokenStream {
    union::derive_dyn_union(input)
}
