#![forbid(unsafe_code)]

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use symbiont_core::{IndexPath, WiringError};

use super::{AddressedBinding, BindingState, BoundView};
use crate::lifecycle::{Activate, SegueDataProvider};
use crate::reactive::{AnyReader, Refresh, ValueSource};
use crate::view_state::ViewSnapshot;

enum Applier<T, V> {
    /// Left untouched when the address yields nothing.
    Required(Box<dyn Fn(&V, &T)>),
    /// Told explicitly when the address yields nothing.
    Optional(Box<dyn Fn(&V, Option<&T>)>),
}

type Setup<T, V> = Box<dyn FnOnce(&Binding<T, V>)>;

/// Applies the value at one address of a source to a group of views.
///
/// # Invariants
///
/// 1. The setup hook runs at most once, during the first activation.
/// 2. Once `Active`, the binding never leaves that state.
/// 3. The source holds the binding weakly; dropping the last `Rc` stops
///    all pushes.
pub struct Binding<T, V> {
    name: String,
    this: Weak<Self>,
    source: RefCell<Option<Rc<dyn ValueSource<T>>>>,
    views: RefCell<Vec<V>>,
    appliers: Vec<Applier<T, V>>,
    setup: RefCell<Option<Setup<T, V>>>,
    snapshots: RefCell<Vec<Option<ViewSnapshot>>>,
    address: Cell<Option<IndexPath>>,
    explicit_address: Cell<bool>,
    state: Cell<BindingState>,
    pushes: Cell<u64>,
}

impl<T, V> fmt::Debug for Binding<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("state", &self.state.get())
            .field("address", &self.address.get())
            .field("views", &self.views.borrow().len())
            .field("appliers", &self.appliers.len())
            .field("pushes", &self.pushes.get())
            .finish()
    }
}

impl<T: Clone + 'static, V: BoundView> Binding<T, V> {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> BindingBuilder<T, V> {
        BindingBuilder {
            name: name.into(),
            source: None,
            views: Vec::new(),
            appliers: Vec::new(),
            setup: None,
            address: None,
        }
    }

    /// Number of times values were pushed to the views.
    #[must_use]
    pub fn push_count(&self) -> u64 {
        self.pushes.get()
    }

    /// The value the views currently show, if any.
    #[must_use]
    pub fn current_value(&self) -> Option<T> {
        let source = self.source.borrow().clone()?;
        source.value_at(self.address.get())
    }

    #[must_use]
    pub fn views(&self) -> Vec<V> {
        self.views.borrow().clone()
    }

    /// Replace the source. An active binding stops watching the old source,
    /// watches the new one and pushes from it once.
    pub fn set_source(&self, source: Rc<dyn ValueSource<T>>) {
        let previous = self.source.borrow_mut().replace(Rc::clone(&source));
        if self.state.get() != BindingState::Active {
            return;
        }
        let target = self.as_refresh();
        if let Some(previous) = previous {
            previous.unwatch(&target);
        }
        let before = self.pushes.get();
        source.watch(target);
        if self.pushes.get() == before {
            self.push();
        }
    }

    /// Replace the views. Only meaningful before activation; snapshots are
    /// taken from the views present when the binding wires up.
    pub fn set_views(&self, views: Vec<V>) {
        *self.views.borrow_mut() = views;
    }

    fn as_refresh(&self) -> Weak<dyn Refresh> {
        self.this.clone()
    }

    fn wire(&self) -> Result<(), WiringError> {
        if self.source.borrow().is_none() {
            return Err(WiringError::MissingSource {
                component: self.name.clone(),
            });
        }
        if self.views.borrow().is_empty() {
            return Err(WiringError::MissingViews {
                component: self.name.clone(),
            });
        }
        self.state.set(BindingState::Wired);

        let setup = self.setup.borrow_mut().take();
        if let Some(setup) = setup {
            setup(self);
        }

        let snapshots = self.views.borrow().iter().map(|view| view.snapshot()).collect();
        *self.snapshots.borrow_mut() = snapshots;
        tracing::debug!(binding = %self.name, views = self.views.borrow().len(), "binding wired");
        Ok(())
    }

    /// Apply the value at the current address to every view.
    fn push(&self) {
        self.pushes.set(self.pushes.get() + 1);
        let Some(source) = self.source.borrow().clone() else {
            return;
        };
        let value = source.value_at(self.address.get());
        // Clone the handles out so appliers may touch the binding.
        let views = self.views.borrow().clone();
        for view in &views {
            for applier in &self.appliers {
                match (applier, value.as_ref()) {
                    (Applier::Required(apply), Some(value)) => apply(view, value),
                    (Applier::Required(_), None) => {}
                    (Applier::Optional(apply), value) => apply(view, value),
                }
            }
        }
    }
}

impl<T: Clone + 'static, V: BoundView> Refresh for Binding<T, V> {
    fn refresh(&self) {
        if self.state.get() == BindingState::Active {
            self.push();
        }
    }
}

impl<T: Clone + 'static, V: BoundView> Activate for Binding<T, V> {
    fn try_activate(&self) -> Result<(), WiringError> {
        match self.state.get() {
            BindingState::Active => return Ok(()),
            BindingState::Uninitialized => self.wire()?,
            BindingState::Wired => {}
        }

        if !self.explicit_address.get() && self.address.get().is_none() {
            self.address.set(Some(IndexPath::ORIGIN));
        }
        self.state.set(BindingState::Active);

        let before = self.pushes.get();
        let source = self.source.borrow().clone();
        if let Some(source) = source {
            source.watch(self.as_refresh());
        }
        // An empty source does not call back on watch; push once anyway so
        // optional setters see the absence.
        if self.pushes.get() == before {
            self.push();
        }
        tracing::debug!(binding = %self.name, address = ?self.address.get(), "binding active");
        Ok(())
    }
}

impl<T: Clone + 'static, V: BoundView> SegueDataProvider for Binding<T, V> {
    fn segue_data(&self) -> Option<AnyReader> {
        let source = self.source.borrow().clone()?;
        source.forward_value(self.address.get())
    }
}

impl<T: Clone + 'static, V: BoundView> AddressedBinding for Binding<T, V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> BindingState {
        self.state.get()
    }

    fn address(&self) -> Option<IndexPath> {
        self.address.get()
    }

    fn set_address(&self, at: Option<IndexPath>) {
        self.address.set(at);
        if self.state.get() == BindingState::Active {
            self.push();
        }
    }

    fn reset(&self) {
        let views = self.views.borrow().clone();
        let snapshots = self.snapshots.borrow().clone();
        for (view, snapshot) in views.iter().zip(&snapshots) {
            if let Some(snapshot) = snapshot {
                view.restore(snapshot);
            }
        }
    }

    fn mark_explicit_address(&self) {
        self.explicit_address.set(true);
    }
}

/// Declares a [`Binding`].
pub struct BindingBuilder<T, V> {
    name: String,
    source: Option<Rc<dyn ValueSource<T>>>,
    views: Vec<V>,
    appliers: Vec<Applier<T, V>>,
    setup: Option<Setup<T, V>>,
    address: Option<IndexPath>,
}

impl<T: Clone + 'static, V: BoundView> BindingBuilder<T, V> {
    #[must_use]
    pub fn source(self, source: impl ValueSource<T>) -> Self {
        self.source_rc(Rc::new(source))
    }

    #[must_use]
    pub fn source_rc(mut self, source: Rc<dyn ValueSource<T>>) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn view(mut self, view: V) -> Self {
        self.views.push(view);
        self
    }

    #[must_use]
    pub fn views(mut self, views: impl IntoIterator<Item = V>) -> Self {
        self.views.extend(views);
        self
    }

    /// Set a property from the value. Left untouched when there is none.
    #[must_use]
    pub fn apply(mut self, apply: impl Fn(&V, &T) + 'static) -> Self {
        self.appliers.push(Applier::Required(Box::new(apply)));
        self
    }

    /// Set a property from the value, or clear it when there is none.
    #[must_use]
    pub fn apply_optional(mut self, apply: impl Fn(&V, Option<&T>) + 'static) -> Self {
        self.appliers.push(Applier::Optional(Box::new(apply)));
        self
    }

    /// One-time hook run during the first activation.
    #[must_use]
    pub fn on_setup(mut self, setup: impl FnOnce(&Binding<T, V>) + 'static) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }

    #[must_use]
    pub fn address(mut self, at: IndexPath) -> Self {
        self.address = Some(at);
        self
    }

    #[must_use]
    pub fn build(self) -> Rc<Binding<T, V>> {
        Rc::new_cyclic(|this| Binding {
            name: self.name,
            this: this.clone(),
            source: RefCell::new(self.source),
            views: RefCell::new(self.views),
            appliers: self.appliers,
            setup: RefCell::new(self.setup),
            snapshots: RefCell::new(Vec::new()),
            address: Cell::new(self.address),
            explicit_address: Cell::new(false),
            state: Cell::new(BindingState::Uninitialized),
            pushes: Cell::new(0),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
