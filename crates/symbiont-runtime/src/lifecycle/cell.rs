#![forbid(unsafe_code)]

//! Reusable cells: bindings that move from row to row.

use std::fmt;
use std::rc::Rc;

use symbiont_core::{IndexPath, WiringError};

use super::segue::SegueDataProvider;
use crate::binding::AddressedBinding;
use crate::reactive::AnyReader;

/// A list cell whose bindings persist across reuse.
///
/// The bindings are created once with the cell. Each reuse only moves
/// their address; it never re-runs their setup.
pub struct ReusableCell {
    name: String,
    bindings: Vec<Rc<dyn AddressedBinding>>,
}

impl fmt::Debug for ReusableCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReusableCell")
            .field("name", &self.name)
            .field("bindings", &self.bindings.len())
            .field("address", &self.address())
            .finish()
    }
}

impl ReusableCell {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_binding<B: AddressedBinding + 'static>(mut self, binding: Rc<B>) -> Self {
        self.bindings.push(binding);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// The row this cell currently shows.
    #[must_use]
    pub fn address(&self) -> Option<IndexPath> {
        self.bindings.first().and_then(|binding| binding.address())
    }

    /// Get ready to show row `at`.
    ///
    /// Every binding is activated (a no-op after the first time) and its
    /// views restored to their baseline before any binding moves to `at`,
    /// so the new row's values are applied onto clean views.
    ///
    /// # Errors
    ///
    /// The first wiring error any binding reports.
    pub fn prepare(&self, at: IndexPath) -> Result<(), WiringError> {
        for binding in &self.bindings {
            binding.mark_explicit_address();
            binding.try_activate()?;
            binding.reset();
        }
        for binding in &self.bindings {
            binding.set_address(Some(at));
        }
        tracing::trace!(cell = %self.name, %at, "cell prepared");
        Ok(())
    }
}

impl SegueDataProvider for ReusableCell {
    fn segue_data(&self) -> Option<AnyReader> {
        self.bindings.first()?.segue_data()
    }
}
