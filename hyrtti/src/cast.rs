//! Downcasting within a closed hierarchy.
//!
//! Members of a hierarchy are Rust types of two shapes: trait objects (`dyn Mammal`) for
//! abstract members and for concrete members that have children, and plain structs for
//! concrete leaves. Instances are always values of a concrete struct, seen through a
//! reference or box to either the struct itself or one of the trait objects above it.
//!
//! The traits below connect those shapes to the identifiers of the hierarchy:
//!
//!  - [`Tagged`] yields the actual identifier of an instance (implemented for concrete
//!    structs, reached from trait objects through a supertrait);
//!  - [`Variant`] names the identifier a type stands for;
//!  - [`Narrow`] reconstructs a reference to the member type from the address of a concrete
//!    instance and its identifier.
//!
//! All of them are normally generated by [`#[derive(Hierarchy)]`](crate::Hierarchy).
use crate::{
    id::HierarchyId,
    utils::error::BadCast,
};

/// A value that knows the identifier of its concrete type.
///
/// # Safety
///
/// `rtti` must return the identifier under which the concrete type of `self` is registered,
/// and the address of `self` must be the address of that concrete value. Narrowing relies on
/// both to reinterpret the pointer.
pub unsafe trait Tagged {
    type Id: HierarchyId;

    fn rtti(&self) -> Self::Id;
}

/// A type standing for one member of a hierarchy.
pub trait Variant {
    type Id: HierarchyId;
    const ID: Self::Id;
}

/// An instantiable struct of a hierarchy.
pub trait Concrete: Tagged + Sized {
    const ID: Self::Id;
}

/// Unchecked reinterpretation of a concrete instance as a hierarchy member.
///
/// # Safety
///
/// Implementations must only produce references to the concrete type registered under
/// `actual`, and must panic (through [`invalid_narrow`]) for identifiers outside the subtree
/// of [`Variant::ID`].
pub unsafe trait Narrow: Variant + 'static {
    /// # Safety
    ///
    /// `object` must point to a live value of the concrete type registered under `actual`,
    /// valid for `'a`.
    unsafe fn narrow_ref<'a>(object: *const (), actual: Self::Id) -> &'a Self;

    /// # Safety
    ///
    /// Same as [`Narrow::narrow_ref`], with unique access.
    unsafe fn narrow_mut<'a>(object: *mut (), actual: Self::Id) -> &'a mut Self;

    /// # Safety
    ///
    /// `object` must come from [`Box::into_raw`] on a box of the concrete type registered
    /// under `actual` (possibly through an unsized coercion).
    unsafe fn narrow_box(object: *mut (), actual: Self::Id) -> Box<Self>;
}

/// Panic raised by generated narrowing code on an identifier outside the target's subtree.
#[cold]
#[track_caller]
pub fn invalid_narrow<T: ?Sized + Variant>(actual: T::Id) -> ! {
    let hierarchy = <T::Id as HierarchyId>::hierarchy();
    panic!(
        "cannot narrow '{}' to '{}' in hierarchy '{}'",
        hierarchy.name(actual),
        hierarchy.name(T::ID),
        <T::Id as HierarchyId>::NAME,
    )
}

#[inline]
pub(crate) fn thin<S: ?Sized>(object: &S) -> *const () {
    (object as *const S).cast::<()>()
}

#[inline]
pub(crate) fn thin_mut<S: ?Sized>(object: &mut S) -> *mut () {
    (object as *mut S).cast::<()>()
}

fn bad_cast<T: ?Sized + Variant>(actual: T::Id) -> BadCast {
    let hierarchy = <T::Id as HierarchyId>::hierarchy();
    BadCast {
        hierarchy: <T::Id as HierarchyId>::NAME,
        actual: hierarchy.name(actual),
        target: hierarchy.name(T::ID),
    }
}

/// Whether `actual` is `T` or one of its descendants.
#[inline]
pub fn isa_id<T: ?Sized + Variant>(actual: T::Id) -> bool {
    <T::Id as HierarchyId>::hierarchy().is_ancestor(T::ID, actual)
}

/// `isa` over a nullable reference; `None` is never an instance of anything.
#[inline]
pub fn isa_ptr<T, S>(object: Option<&S>) -> bool
where
    T: ?Sized + Variant<Id = S::Id>,
    S: ?Sized + Tagged,
{
    object.is_some_and(|object| object.isa::<T>())
}

/// `dyncast` over a nullable reference.
#[inline]
pub fn dyncast_ptr<T, S>(object: Option<&S>) -> Option<&T>
where
    T: ?Sized + Narrow<Id = S::Id>,
    S: ?Sized + Tagged,
{
    object.and_then(|object| object.dyncast::<T>())
}

/// Keep the elements of `iter` that are instances of `T`, narrowed to `T`.
pub fn filter_isa<'a, T, S>(iter: impl IntoIterator<Item = &'a S>) -> impl Iterator<Item = &'a T>
where
    T: ?Sized + Narrow<Id = S::Id>,
    S: ?Sized + Tagged + 'a,
{
    iter.into_iter().filter_map(|object| object.dyncast::<T>())
}

/// Downcasting operations, available on every [`Tagged`] type.
pub trait DynCast: Tagged {
    /// Whether `self` is an instance of `T` (its actual type is `T` or descends from it).
    #[inline]
    fn isa<T>(&self) -> bool
    where
        T: ?Sized + Variant<Id = Self::Id>,
    {
        isa_id::<T>(self.rtti())
    }

    /// `self` as a `T`, or `None` if it is not an instance of `T`.
    #[inline]
    fn dyncast<T>(&self) -> Option<&T>
    where
        T: ?Sized + Narrow<Id = Self::Id>,
    {
        let actual = self.rtti();
        isa_id::<T>(actual).then(|| unsafe { T::narrow_ref(thin(self), actual) })
    }

    #[inline]
    fn dyncast_mut<T>(&mut self) -> Option<&mut T>
    where
        T: ?Sized + Narrow<Id = Self::Id>,
    {
        let actual = self.rtti();
        if isa_id::<T>(actual) {
            Some(unsafe { T::narrow_mut(thin_mut(self), actual) })
        } else {
            None
        }
    }

    /// `self` as a `T`, failing with [`BadCast`] if it is not an instance of `T`.
    #[inline]
    fn try_dyncast<T>(&self) -> Result<&T, BadCast>
    where
        T: ?Sized + Narrow<Id = Self::Id>,
    {
        let actual = self.rtti();
        self.dyncast::<T>().ok_or_else(|| bad_cast::<T>(actual))
    }

    #[inline]
    fn try_dyncast_mut<T>(&mut self) -> Result<&mut T, BadCast>
    where
        T: ?Sized + Narrow<Id = Self::Id>,
    {
        let actual = self.rtti();
        self.dyncast_mut::<T>().ok_or_else(|| bad_cast::<T>(actual))
    }

    /// Rebind an owned instance to `T`. On failure the box is handed back untouched.
    fn dyncast_box<T>(self: Box<Self>) -> Result<Box<T>, Box<Self>>
    where
        T: ?Sized + Narrow<Id = Self::Id>,
    {
        let actual = self.rtti();
        if isa_id::<T>(actual) {
            let object = Box::into_raw(self).cast::<()>();
            Ok(unsafe { T::narrow_box(object, actual) })
        } else {
            Err(self)
        }
    }

    /// `self` as a `T` without checking.
    ///
    /// # Safety
    ///
    /// `self` must be an instance of `T`. Debug builds assert it; release builds panic when
    /// the identifier lies outside `T`'s subtree.
    #[inline]
    unsafe fn cast<T>(&self) -> &T
    where
        T: ?Sized + Narrow<Id = Self::Id>,
    {
        let actual = self.rtti();
        debug_assert!(isa_id::<T>(actual), "{}", bad_cast::<T>(actual));
        unsafe { T::narrow_ref(thin(self), actual) }
    }

    /// # Safety
    ///
    /// See [`DynCast::cast`].
    #[inline]
    unsafe fn cast_mut<T>(&mut self) -> &mut T
    where
        T: ?Sized + Narrow<Id = Self::Id>,
    {
        let actual = self.rtti();
        debug_assert!(isa_id::<T>(actual), "{}", bad_cast::<T>(actual));
        unsafe { T::narrow_mut(thin_mut(self), actual) }
    }

    /// # Safety
    ///
    /// See [`DynCast::cast`].
    unsafe fn cast_box<T>(self: Box<Self>) -> Box<T>
    where
        T: ?Sized + Narrow<Id = Self::Id>,
    {
        let actual = self.rtti();
        debug_assert!(isa_id::<T>(actual), "{}", bad_cast::<T>(actual));
        let object = Box::into_raw(self).cast::<()>();
        unsafe { T::narrow_box(object, actual) }
    }
}

impl<S: ?Sized + Tagged> DynCast for S {}
