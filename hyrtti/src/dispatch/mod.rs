//! Multiple dispatch over closed hierarchies.
//!
//! Dispatch tables are built once from a handler set and are immutable afterwards; store them
//! in a `Lazy` static to share them across calls and threads.
/// Mixed-radix encoding of argument combinations.
pub mod index;
mod overload;
mod table;

pub use overload::{
    DispatchTable1, DispatchTable2, DispatchTable3, DispatchTable4, DispatchTableMut1,
    DispatchTableMut2, DispatchTableMut3, DispatchTableMut4, Overload1, Overload2, Overload3,
    Overload4, OverloadMut1, OverloadMut2, OverloadMut3, OverloadMut4, bind,
};
pub use table::TableLayout;
