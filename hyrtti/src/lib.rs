//! Hyrtti: runtime type information, downcasting and multiple dispatch for closed hierarchies.
//!
//! A closed hierarchy is a tree of variants known in full when it is registered: abstract
//! variants group others, concrete variants are the actual types of instances. Each hierarchy
//! is keyed by a fieldless identifier enum whose values are dense table indices, which lets
//! every query run against precomputed flat tables:
//!
//!  - `isa` / `dyncast` / `cast` test a single bit of an ancestor table;
//!  - `visit` / `visit_mut` over up to four arguments read one slot of a compacted dispatch
//!    table;
//!  - tagged unions route their accessors through the same machinery.
//!
//! Example
//! ```
//! use hyrtti::prelude::*;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::FromRepr, Hierarchy)]
//! #[repr(u8)]
//! enum ShapeId {
//!     #[hierarchy(ty = dyn Shape)]
//!     Shape,
//!     #[hierarchy(ty = Circle, parent = Shape, concrete)]
//!     Circle,
//!     #[hierarchy(ty = Square, parent = Shape, concrete)]
//!     Square,
//! }
//!
//! trait Shape: Tagged<Id = ShapeId> {}
//! struct Circle(f64);
//! struct Square(f64);
//! impl Shape for Circle {}
//! impl Shape for Square {}
//!
//! let shape: Box<dyn Shape> = Box::new(Circle(1.0));
//! assert!(shape.isa::<Circle>());
//! assert!(shape.dyncast::<Square>().is_none());
//!
//! let area = Overload1::<dyn Shape, f64>::new()
//!     .on::<Circle>(|c| std::f64::consts::PI * c.0 * c.0)
//!     .on::<Square>(|s| s.0 * s.0)
//!     .build()
//!     .unwrap();
//! assert_eq!(area.visit(&*shape), std::f64::consts::PI);
//! ```

/// Ancestor tables and parent-chain walks.
pub mod ancestry;
/// Downcasting: `isa`, `dyncast` and trusted casts.
pub mod cast;
/// Multiple dispatch tables and handler sets.
pub mod dispatch;
/// Identifier enums and their value domain.
pub mod id;
/// Registration and queries of closed hierarchies.
pub mod registry;
/// Tagged unions over a sub-hierarchy.
pub mod union;
/// Errors and configuration.
pub mod utils;

pub use cast::{
    Concrete, DynCast, Narrow, Tagged, Variant, dyncast_ptr, filter_isa, isa_id, isa_ptr,
};
pub use dispatch::{
    DispatchTable1, DispatchTable2, DispatchTable3, DispatchTable4, DispatchTableMut1,
    DispatchTableMut2, DispatchTableMut3, DispatchTableMut4, Overload1, Overload2, Overload3,
    Overload4, OverloadMut1, OverloadMut2, OverloadMut3, OverloadMut4, TableLayout, bind,
};
pub use id::{HierarchyId, IdDomain};
pub use registry::{Corporeality, Descriptor, Hierarchy, HierarchyBuilder};
pub use union::DynUnion;
pub use utils::{
    conf::{DispatchConfig, DomainConfig},
    error::{BadCast, RttiError, RttiResult},
};

#[cfg(feature = "derive")]
pub use hyrtti_derive::{DynUnion, Hierarchy};

pub mod prelude {
    //! Convenient re-exports for end users.
    //!
    //! - Identifier and hierarchy types
    //! - Downcasting traits and free functions
    //! - Handler sets and dispatch tables
    //! - Derive macros (with the `derive` feature)
    pub use crate::cast::{
        Concrete, DynCast, Narrow, Tagged, Variant, dyncast_ptr, filter_isa, isa_id, isa_ptr,
    };
    pub use crate::dispatch::{
        DispatchTable1, DispatchTable2, DispatchTable3, DispatchTable4, DispatchTableMut1,
        DispatchTableMut2, DispatchTableMut3, DispatchTableMut4, Overload1, Overload2, Overload3,
        Overload4, OverloadMut1, OverloadMut2, OverloadMut3, OverloadMut4, bind,
    };
    pub use crate::id::HierarchyId;
    pub use crate::registry::Hierarchy;
    pub use crate::union::DynUnion;
    pub use crate::utils::{conf::DispatchConfig, error::BadCast};

    #[cfg(feature = "derive")]
    pub use hyrtti_derive::{DynUnion, Hierarchy};
}

#[doc(hidden)]
pub mod __private {
    //! Support items for generated code.
    pub use crate::cast::invalid_narrow;
    pub use once_cell::sync::Lazy;
}
