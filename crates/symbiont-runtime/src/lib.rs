#![forbid(unsafe_code)]

//! Runtime: outlets, bindings, and scene lifecycle.
//!
//! # Role in Symbiont
//! `symbiont-runtime` is where data meets views. Producers set values on an
//! [`Outlet`]; every [`Binding`] watching it looks up the value at its
//! [`IndexPath`] and applies it to its views. [`Scene`]s activate all of
//! this once per screen, [`ReusableCell`]s move bindings between rows, and
//! transitions forward data between scenes through [`AnyOutlet::try_set`].
//!
//! # Threading
//! Everything here is single-threaded (`Rc`, `RefCell`) and meant to live
//! on the UI thread. Producers on other threads must hop back before
//! calling `set`.
//!
//! # How it fits in the system
//! Addressing, configuration and [`WiringError`] come from
//! `symbiont-core`. The toolkit supplies views by implementing
//! [`BoundView`], [`Hideable`], [`ListHost`] and [`PickerHost`]; `symbiont-harness` has
//! in-memory fakes of those for tests.

pub mod binding;
pub mod lifecycle;
pub mod reactive;
pub mod view_state;

pub use binding::{
    AddressedBinding, Binding, BindingBuilder, BindingSet, BindingSetBuilder, BindingState,
    BoundView, Hideable, ListBinding, ListBindingBuilder, ListHost, LoadStateBinding,
    LoadStateBuilder, PickFilter, PickerBinding, PickerBindingBuilder, PickerHost,
    PickerResponder,
};
pub use lifecycle::{
    ActionResponder, Activate, DataSource, Pageable, Receptacle, Refreshable, Responder,
    ReusableCell, Scene, SegueButton, SegueDataProvider, SelectionResponder, split_list,
};
pub use reactive::{
    AnyOutlet, AnyReader, ErasedObserver, ForwardSelection, Observer, Outlet, OutletReader,
    Refresh, Sectioned, Subscription, ValueSource,
};
pub use symbiont_core::{Config, IndexPath, SectionFallback, WiringError};
pub use view_state::{
    BaseAppearance, ButtonAppearance, ContentMode, ControlState, DetailAppearance,
    ImageAppearance, LabelAppearance, Rgba, TextAlignment, ViewSnapshot,
};

/// Everything needed to declare scenes and bindings.
pub mod prelude {
    pub use crate::binding::{
        AddressedBinding, Binding, BindingSet, BoundView, Hideable, ListBinding, ListHost,
        LoadStateBinding, PickerBinding, PickerHost, PickerResponder,
    };
    pub use crate::lifecycle::{
        Activate, DataSource, ReusableCell, Scene, SegueButton, SegueDataProvider,
        SelectionResponder,
    };
    pub use crate::reactive::{AnyReader, ForwardSelection, Outlet, OutletReader, ValueSource};
    pub use symbiont_core::{IndexPath, WiringError};
}
