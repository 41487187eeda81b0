#![forbid(unsafe_code)]

//! Observable outlets, their type-erased façades, and addressed sources.

pub mod erased;
pub mod outlet;
pub mod source;

pub use erased::{AnyOutlet, AnyReader, ErasedObserver, ForwardSelection};
pub use outlet::{Observer, Outlet, OutletReader, Subscription};
pub use source::{Refresh, Sectioned, ValueSource};
