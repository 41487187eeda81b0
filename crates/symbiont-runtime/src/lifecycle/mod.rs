#![forbid(unsafe_code)]

//! Activation ordering for scenes, data sources and reusable cells, plus
//! data forwarding across scene transitions.

pub mod cell;
pub mod data_source;
pub mod scene;
pub mod segue;

pub use cell::ReusableCell;
pub use data_source::{DataSource, Pageable, Receptacle, Refreshable, split_list};
pub use scene::{ActionResponder, Responder, Scene, SelectionResponder};
pub use segue::{SegueButton, SegueDataProvider};

use symbiont_core::WiringError;

/// A component with a one-time activation step.
///
/// Activation is idempotent: calling it again after success does nothing.
pub trait Activate {
    /// Activate, reporting a broken declaration as an error.
    fn try_activate(&self) -> Result<(), WiringError>;

    /// Activate, treating a broken declaration as fatal.
    ///
    /// # Panics
    ///
    /// Panics with the error's message if [`try_activate`](Self::try_activate)
    /// fails. A wiring error can never succeed later, so it is surfaced at
    /// the first activation.
    fn activate(&self) {
        if let Err(err) = self.try_activate() {
            tracing::error!(component = err.component(), error = %err, "activation failed");
            panic!("{err}");
        }
    }
}
