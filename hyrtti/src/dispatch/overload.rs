//! Handler sets and the dispatch tables built from them.
//!
//! An `OverloadN` collects cases, each a callable over references to hierarchy members
//! (`&T0, .., &TN-1`). Building it resolves, for every reachable combination of concrete
//! arguments, the most specific case, and yields a `DispatchTableN` whose `visit` routes
//! arguments through a single table lookup. `OverloadMutN` / `DispatchTableMutN` do the same
//! over unique references (`&mut T0, ..`) and dispatch with `visit_mut`.
//!
//! Every table also carries a context type `C` (`()` by default). Cases added with `on_with`
//! receive `&mut C` in front of the arguments, and `visit_with` / `visit_mut_with` supply it per
//! call, so a table built once can serve visitors that keep mutable state.
use std::{fmt, marker::PhantomData};

use crate::{
    cast::{Narrow, Tagged, Variant},
    dispatch::{
        index::MultiIndex,
        table::{Position, RawArg, TableLayout},
    },
    id::HierarchyId,
    utils::{conf::DispatchConfig, error::RttiResult},
};

/// Adapt a method bound to `receiver` into a single-argument callable usable as a case.
pub fn bind<'r, Recv, T, R>(
    receiver: &'r Recv,
    method: fn(&Recv, &T) -> R,
) -> impl Fn(&T) -> R + Send + Sync + 'r
where
    Recv: ?Sized + Sync,
    T: ?Sized + 'r,
    R: 'r,
{
    move |argument: &T| method(receiver, argument)
}

macro_rules! shared_ref {
    ($T:ident) => { &$T };
}

macro_rules! unique_ref {
    ($T:ident) => { &mut $T };
}

macro_rules! dispatch_arity {
    (
        $(#[$doc:meta])*
        $overload:ident, $table:ident;
        access: $access:ident, $of:ident, $narrow:ident;
        visit: $visit:ident, $visit_with:ident;
        $(($S:ident, $T:ident, $A:ident, $a:ident)),+
    ) => {
        $(#[$doc])*
        pub struct $overload<'h, $($S: ?Sized + Variant,)+ R, C = ()> {
            cases: Vec<(
                MultiIndex,
                Box<dyn Fn(&mut C, $(RawArg<<$S as Variant>::Id>),+) -> R + Send + Sync + 'h>,
            )>,
            _marker: PhantomData<fn(&mut C, $(&$S),+)>,
        }

        impl<'h, $($S: ?Sized + Variant,)+ R, C> Default for $overload<'h, $($S,)+ R, C> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<'h, $($S: ?Sized + Variant,)+ R, C> $overload<'h, $($S,)+ R, C> {
            pub fn new() -> Self {
                Self {
                    cases: Vec::new(),
                    _marker: PhantomData,
                }
            }

            /// Add a case handling arguments that are instances of the given members.
            pub fn on<$($T),+>(self, f: impl Fn($($access!($T)),+) -> R + Send + Sync + 'h) -> Self
            where
                $($T: ?Sized + Narrow<Id = <$S as Variant>::Id>,)+
            {
                self.on_into::<$($T,)+ R>(f)
            }

            /// Add a case whose result converts into the table's result type.
            pub fn on_into<$($T,)+ U>(
                self,
                f: impl Fn($($access!($T)),+) -> U + Send + Sync + 'h,
            ) -> Self
            where
                $($T: ?Sized + Narrow<Id = <$S as Variant>::Id>,)+
                U: Into<R>,
            {
                self.on_with::<$($T),+>(move |_: &mut C, $($a),+| f($($a),+).into())
            }

            /// Add a case that also receives the context passed to the visit.
            pub fn on_with<$($T),+>(
                mut self,
                f: impl Fn(&mut C, $($access!($T)),+) -> R + Send + Sync + 'h,
            ) -> Self
            where
                $($T: ?Sized + Narrow<Id = <$S as Variant>::Id>,)+
            {
                let signature: MultiIndex = [$(<$T as Variant>::ID.index()),+].into_iter().collect();
                let handler = move |context: &mut C, $($a: RawArg<<$S as Variant>::Id>),+| -> R {
                    // The table only routes an argument to this case when its identifier
                    // descends from the declared member.
                    f(context, $(unsafe { $a.$narrow::<$T>() }),+)
                };
                self.cases.push((signature, Box::new(handler)));
                self
            }

            /// Number of cases added so far.
            pub fn len(&self) -> usize {
                self.cases.len()
            }

            pub fn is_empty(&self) -> bool {
                self.cases.is_empty()
            }

            pub fn build(self) -> RttiResult<$table<'h, $($S,)+ R, C>> {
                self.build_with(&DispatchConfig::default())
            }

            pub fn build_with(self, config: &DispatchConfig) -> RttiResult<$table<'h, $($S,)+ R, C>> {
                let positions = [$(Position::of::<$S>()),+].into_iter().collect();
                let (signatures, handlers): (Vec<_>, Vec<_>) = self.cases.into_iter().unzip();
                let layout = TableLayout::resolve(positions, signatures, config)?;
                Ok($table {
                    layout,
                    handlers,
                    _marker: PhantomData,
                })
            }
        }

        #[doc = concat!("Dispatch table built by [`", stringify!($overload), "`].")]
        pub struct $table<'h, $($S: ?Sized + Variant,)+ R, C = ()> {
            layout: TableLayout,
            handlers: Vec<Box<dyn Fn(&mut C, $(RawArg<<$S as Variant>::Id>),+) -> R + Send + Sync + 'h>>,
            _marker: PhantomData<fn(&mut C, $(&$S),+)>,
        }

        impl<'h, $($S: ?Sized + Variant,)+ R, C> $table<'h, $($S,)+ R, C> {
            /// Invoke the case selected for the actual types of the arguments, handing it
            /// `context`.
            ///
            /// # Panics
            ///
            /// When no case covers the combination, which only happens for tables built with
            /// `exhaustive` disabled or for arguments outside the table's static subtrees.
            #[inline]
            #[track_caller]
            pub fn $visit_with<$($A),+>(&self, context: &mut C, $($a: $access!($A)),+) -> R
            where
                $($A: ?Sized + Tagged<Id = <$S as Variant>::Id>,)+
            {
                $(let $a = RawArg::$of($a);)+
                let case = self.layout.lookup(&[$($a.id().index()),+]);
                (self.handlers[case])(context, $($a),+)
            }

            pub fn layout(&self) -> &TableLayout {
                &self.layout
            }
        }

        impl<'h, $($S: ?Sized + Variant,)+ R> $table<'h, $($S,)+ R> {
            /// Invoke the case selected for the actual types of the arguments.
            ///
            /// # Panics
            ///
            /// Same as the context-passing form.
            #[inline]
            #[track_caller]
            pub fn $visit<$($A),+>(&self, $($a: $access!($A)),+) -> R
            where
                $($A: ?Sized + Tagged<Id = <$S as Variant>::Id>,)+
            {
                self.$visit_with(&mut (), $($a),+)
            }
        }

        impl<'h, $($S: ?Sized + Variant,)+ R, C> fmt::Debug for $table<'h, $($S,)+ R, C> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($table))
                    .field("layout", &self.layout)
                    .finish_non_exhaustive()
            }
        }
    };
}

dispatch_arity! {
    /// Handler set over one argument.
    ///
    /// `S0` is the static type of the argument; the table covers the concrete members of its
    /// subtree. `R` is the result type shared by every case, `C` the visit context.
    Overload1, DispatchTable1;
    access: shared_ref, of, narrow;
    visit: visit, visit_with;
    (S0, T0, A0, a0)
}

dispatch_arity! {
    /// Handler set over two arguments, possibly from different hierarchies.
    Overload2, DispatchTable2;
    access: shared_ref, of, narrow;
    visit: visit, visit_with;
    (S0, T0, A0, a0), (S1, T1, A1, a1)
}

dispatch_arity! {
    /// Handler set over three arguments.
    Overload3, DispatchTable3;
    access: shared_ref, of, narrow;
    visit: visit, visit_with;
    (S0, T0, A0, a0), (S1, T1, A1, a1), (S2, T2, A2, a2)
}

dispatch_arity! {
    /// Handler set over four arguments.
    Overload4, DispatchTable4;
    access: shared_ref, of, narrow;
    visit: visit, visit_with;
    (S0, T0, A0, a0), (S1, T1, A1, a1), (S2, T2, A2, a2), (S3, T3, A3, a3)
}

dispatch_arity! {
    /// Handler set over one argument held with unique access.
    ///
    /// Cases receive `&mut T0`; the table dispatches with `visit_mut`.
    OverloadMut1, DispatchTableMut1;
    access: unique_ref, of_mut, narrow_mut;
    visit: visit_mut, visit_mut_with;
    (S0, T0, A0, a0)
}

dispatch_arity! {
    /// Handler set over two arguments held with unique access.
    OverloadMut2, DispatchTableMut2;
    access: unique_ref, of_mut, narrow_mut;
    visit: visit_mut, visit_mut_with;
    (S0, T0, A0, a0), (S1, T1, A1, a1)
}

dispatch_arity! {
    OverloadMut3, DispatchTableMut3;
    access: unique_ref, of_mut, narrow_mut;
    visit: visit_mut, visit_mut_with;
    (S0, T0, A0, a0), (S1, T1, A1, a1), (S2, T2, A2, a2)
}

dispatch_arity! {
    OverloadMut4, DispatchTableMut4;
    access: unique_ref, of_mut, narrow_mut;
    visit: visit_mut, visit_mut_with;
    (S0, T0, A0, a0), (S1, T1, A1, a1), (S2, T2, A2, a2), (S3, T3, A3, a3)
}
