#![forbid(unsafe_code)]

//! Scene-owned data sources.

use std::cell::{Cell, RefCell};
use std::fmt;

use symbiont_core::WiringError;

use super::Activate;
use crate::reactive::{AnyReader, Outlet, OutletReader};

/// A source that can fetch further pages on demand.
pub trait Pageable {
    fn more_available(&self) -> bool;
    fn load_more(&self);
}

/// A source that can re-fetch its contents (pull to refresh).
pub trait Refreshable {
    fn reload(&self);
}

/// A scene component that may accept data forwarded by a transition.
pub trait Receptacle {
    /// Whether this receptacle takes forwarded data at all.
    fn accepts_forwarded(&self) -> bool;

    /// Try to take `data`. Returns `true` if it was stored.
    fn receive_forwarded(&self, data: &AnyReader) -> bool;
}

type Initializer<T> = Box<dyn FnOnce(&Outlet<T>)>;

/// Split a comma-separated list such as `"red, green"`. Items are trimmed
/// and empty items dropped.
#[must_use]
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// The owner of an outlet within a scene.
///
/// Consumers get readers; only the data source (and through it, its
/// initializer and incoming transitions) ever sets the outlet.
pub struct DataSource<T> {
    name: String,
    outlet: Outlet<T>,
    segue_can_set: bool,
    initializer: RefCell<Option<Initializer<T>>>,
    initialized: Cell<bool>,
}

impl<T: fmt::Debug> fmt::Debug for DataSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("name", &self.name)
            .field("outlet", &self.outlet)
            .field("segue_can_set", &self.segue_can_set)
            .field("initialized", &self.initialized.get())
            .finish()
    }
}

impl<T: Clone + 'static> DataSource<T> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_values(name, Vec::new())
    }

    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<T>) -> Self {
        Self {
            name: name.into(),
            outlet: Outlet::with_values(values),
            segue_can_set: true,
            initializer: RefCell::new(None),
            initialized: Cell::new(false),
        }
    }

    /// Run `init` once, at activation, with the owned outlet.
    #[must_use]
    pub fn with_initializer(self, init: impl FnOnce(&Outlet<T>) + 'static) -> Self {
        *self.initializer.borrow_mut() = Some(Box::new(init));
        self
    }

    /// Whether incoming transitions may replace the contents.
    #[must_use]
    pub fn with_segue_can_set(mut self, enabled: bool) -> Self {
        self.segue_can_set = enabled;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owned outlet. Only the owner should set it.
    #[must_use]
    pub fn outlet(&self) -> &Outlet<T> {
        &self.outlet
    }

    #[must_use]
    pub fn reader(&self) -> OutletReader<T> {
        self.outlet.reader()
    }

    #[must_use]
    pub fn erased(&self) -> AnyReader {
        self.outlet.reader().erased()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }
}

impl DataSource<String> {
    /// A source prefilled from a comma-separated list, split with
    /// [`split_list`].
    #[must_use]
    pub fn from_static_list(name: impl Into<String>, list: &str) -> Self {
        Self::with_values(name, split_list(list))
    }
}

impl<T: Clone + 'static> Activate for DataSource<T> {
    fn try_activate(&self) -> Result<(), WiringError> {
        if self.initialized.replace(true) {
            return Ok(());
        }
        let init = self.initializer.borrow_mut().take();
        if let Some(init) = init {
            init(&self.outlet);
        }
        tracing::debug!(source = %self.name, count = self.outlet.count(), "data source initialized");
        Ok(())
    }
}

impl<T: Clone + 'static> Receptacle for DataSource<T> {
    fn accepts_forwarded(&self) -> bool {
        self.segue_can_set
    }

    fn receive_forwarded(&self, data: &AnyReader) -> bool {
        self.segue_can_set && self.outlet.erased().try_set_from(data)
    }
}
