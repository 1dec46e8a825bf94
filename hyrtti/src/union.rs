//! Tagged unions over a sub-hierarchy.
//!
//! A union is a Rust enum with one single-field variant per alternative, each holding a
//! concrete struct of the same sub-hierarchy. [`#[derive(DynUnion)]`](crate::DynUnion)
//! implements [`DynUnion`] for it. The active identifier is read from the stored value, the
//! enum discriminant only drives moves, drops and clones.
use crate::{
    cast::{DynCast, Narrow, Tagged, Variant},
    dispatch::{DispatchTable1, DispatchTableMut1},
    id::HierarchyId,
    utils::error::BadCast,
};

pub trait DynUnion: Sized {
    type Id: HierarchyId;

    /// Common ancestor of every alternative.
    type Base: ?Sized + Narrow<Id = Self::Id> + Tagged<Id = Self::Id>;

    /// The active alternative, seen as the base.
    fn base(&self) -> &Self::Base;

    fn base_mut(&mut self) -> &mut Self::Base;

    /// Identifiers of the alternatives, in declaration order.
    fn alternatives() -> &'static [Self::Id];

    /// Identifier of the active alternative.
    #[inline]
    fn rtti(&self) -> Self::Id {
        self.base().rtti()
    }

    /// Whether the active alternative is an instance of `T`.
    #[inline]
    fn is<T>(&self) -> bool
    where
        T: ?Sized + Variant<Id = Self::Id>,
    {
        self.base().isa::<T>()
    }

    fn try_get<T>(&self) -> Result<&T, BadCast>
    where
        T: ?Sized + Narrow<Id = Self::Id>,
    {
        self.base().try_dyncast::<T>()
    }

    fn try_get_mut<T>(&mut self) -> Result<&mut T, BadCast>
    where
        T: ?Sized + Narrow<Id = Self::Id>,
    {
        self.base_mut().try_dyncast_mut::<T>()
    }

    /// The active alternative as a `T`.
    ///
    /// # Panics
    ///
    /// If the active alternative is not an instance of `T`.
    #[track_caller]
    fn get<T>(&self) -> &T
    where
        T: ?Sized + Narrow<Id = Self::Id>,
    {
        match self.try_get::<T>() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    #[track_caller]
    fn get_mut<T>(&mut self) -> &mut T
    where
        T: ?Sized + Narrow<Id = Self::Id>,
    {
        match self.try_get_mut::<T>() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Dispatch the active alternative through `table`.
    #[track_caller]
    fn visit<S, R>(&self, table: &DispatchTable1<'_, S, R>) -> R
    where
        S: ?Sized + Variant<Id = Self::Id>,
    {
        table.visit(self.base())
    }

    /// Dispatch the active alternative through `table`, handing the selected case `context`.
    #[track_caller]
    fn visit_with<S, R, C>(&self, table: &DispatchTable1<'_, S, R, C>, context: &mut C) -> R
    where
        S: ?Sized + Variant<Id = Self::Id>,
    {
        table.visit_with(context, self.base())
    }

    /// Dispatch the active alternative with unique access.
    #[track_caller]
    fn visit_mut<S, R>(&mut self, table: &DispatchTableMut1<'_, S, R>) -> R
    where
        S: ?Sized + Variant<Id = Self::Id>,
    {
        table.visit_mut(self.base_mut())
    }

    #[track_caller]
    fn visit_mut_with<S, R, C>(&mut self, table: &DispatchTableMut1<'_, S, R, C>, context: &mut C) -> R
    where
        S: ?Sized + Variant<Id = Self::Id>,
    {
        table.visit_mut_with(context, self.base_mut())
    }

    /// Whether the alternatives cover every concrete descendant of the base.
    fn is_complete() -> bool {
        let alternatives = Self::alternatives();
        <Self::Id as HierarchyId>::hierarchy()
            .concrete_descendants(<Self::Base as Variant>::ID)
            .all(|id| alternatives.contains(&id))
    }
}
