#![forbid(unsafe_code)]

//! Bindings from addressed values to view properties.
//!
//! A [`Binding`] reads one value from a [`ValueSource`](crate::reactive::ValueSource)
//! at its current address and applies it to its views. It moves through
//! [`BindingState`] once, then stays `Active` for the rest of its life,
//! re-pushing whenever its source changes or its address moves.
//!
//! [`BindingSet`] shares a source among several bindings. [`ListBinding`]
//! drives a list view and [`PickerBinding`] a picker view.
//! [`LoadStateBinding`] toggles views once data arrives.

mod single;
pub mod list;
pub mod load_state;
pub mod picker;
pub mod set;

pub use single::{Binding, BindingBuilder};
pub use list::{ListBinding, ListBindingBuilder, ListHost};
pub use load_state::{Hideable, LoadStateBinding, LoadStateBuilder};
pub use picker::{PickFilter, PickerBinding, PickerBindingBuilder, PickerHost, PickerResponder};
pub use set::{BindingSet, BindingSetBuilder};

use std::cell::RefCell;
use std::rc::Rc;

use symbiont_core::IndexPath;

use crate::lifecycle::{Activate, SegueDataProvider};
use crate::view_state::ViewSnapshot;

/// Where a binding is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingState {
    /// Declared, not yet validated.
    #[default]
    Uninitialized,
    /// Validated and set up; not yet receiving updates.
    Wired,
    /// Receiving updates and pushing values.
    Active,
}

/// A handle to a toolkit view that bindings write to.
///
/// Handles are cheap to clone and share the underlying view. A view that
/// can report its appearance takes part in cell reuse: its snapshot is
/// captured once when its binding wires up and restored on every reset.
///
/// The runtime never walks a view hierarchy itself. A composite view whose
/// subviews are styled per row captures them in
/// [`ViewSnapshot::children`] and puts them back in
/// [`restore`](Self::restore).
pub trait BoundView: Clone + 'static {
    fn snapshot(&self) -> Option<ViewSnapshot> {
        None
    }

    fn restore(&self, _snapshot: &ViewSnapshot) {}
}

impl<T: 'static> BoundView for Rc<RefCell<T>> {}

/// The address-driven surface shared by bindings, binding sets and cells.
pub trait AddressedBinding: Activate + SegueDataProvider {
    fn name(&self) -> &str;

    fn state(&self) -> BindingState;

    fn address(&self) -> Option<IndexPath>;

    /// Move to `at`. An active binding re-pushes immediately.
    fn set_address(&self, at: Option<IndexPath>);

    /// Restore every view to its captured baseline.
    fn reset(&self);

    /// The address will be assigned from outside (a cell or a set), so
    /// activation must not default it.
    fn mark_explicit_address(&self);
}
