#![forbid(unsafe_code)]

//! Transition triggers that carry data.

use crate::reactive::{AnyReader, ForwardSelection};

/// Something a transition can be triggered from that may carry data.
pub trait SegueDataProvider {
    /// The data to forward, already detached from the trigger's own outlet.
    fn segue_data(&self) -> Option<AnyReader>;
}

/// A plain control that triggers a transition and forwards part of an
/// outlet's contents.
#[derive(Debug, Clone)]
pub struct SegueButton {
    name: String,
    source: Option<AnyReader>,
    selection: ForwardSelection,
}

impl SegueButton {
    #[must_use]
    pub fn new(name: impl Into<String>, source: AnyReader, selection: ForwardSelection) -> Self {
        Self {
            name: name.into(),
            source: Some(source),
            selection,
        }
    }

    /// A trigger that forwards nothing.
    #[must_use]
    pub fn without_data(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            selection: ForwardSelection::All,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn selection(&self) -> ForwardSelection {
        self.selection
    }
}

impl SegueDataProvider for SegueButton {
    fn segue_data(&self) -> Option<AnyReader> {
        self.source
            .as_ref()
            .map(|source| source.forward(self.selection))
    }
}
