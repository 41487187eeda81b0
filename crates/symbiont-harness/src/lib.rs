#![forbid(unsafe_code)]

//! Test harness: in-memory stand-ins for the toolkit.
//!
//! # Role in Symbiont
//! The runtime never touches a real view hierarchy; it talks to traits
//! ([`BoundView`](symbiont_runtime::BoundView),
//! [`Hideable`](symbiont_runtime::Hideable),
//! [`ListHost`](symbiont_runtime::ListHost),
//! [`PickerHost`](symbiont_runtime::PickerHost)). This crate implements those
//! traits with fakes that record what was done to them, so scenes, cells
//! and transitions can be exercised end to end in plain `cargo test`.

pub mod fixtures;
pub mod logging;
pub mod views;

pub use fixtures::{
    CountingPager, DelayedDataSource, FakeList, FakePicker, RecordingPicks, RecordingResponder,
};
pub use logging::init_test_logging;
pub use views::{Fake, FakeButton, FakeImageView, FakeLabel, FakeView, Plain, ViewDetail};
