#![forbid(unsafe_code)]

//! Several bindings over one shared source.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use symbiont_core::{IndexPath, WiringError};

use super::{AddressedBinding, Binding, BindingState, BoundView};
use crate::lifecycle::{Activate, SegueDataProvider};
use crate::reactive::{AnyReader, ValueSource};

type SetSetup<T> = Box<dyn FnOnce(&BindingSet<T>) -> Result<(), WiringError>>;

/// A group of bindings that all read from the same source at the same
/// address, declared and activated as one unit.
///
/// Members are wired by [`associate`](Self::associate) from inside the
/// setup hook. A set whose setup associates nothing is a broken declaration.
pub struct BindingSet<T> {
    name: String,
    source: RefCell<Option<Rc<dyn ValueSource<T>>>>,
    members: RefCell<Vec<Rc<dyn AddressedBinding>>>,
    setup: RefCell<Option<SetSetup<T>>>,
    address: Cell<Option<IndexPath>>,
    explicit_address: Cell<bool>,
    state: Cell<BindingState>,
}

impl<T> fmt::Debug for BindingSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingSet")
            .field("name", &self.name)
            .field("state", &self.state.get())
            .field("address", &self.address.get())
            .field("members", &self.members.borrow().len())
            .finish()
    }
}

impl<T: Clone + 'static> BindingSet<T> {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> BindingSetBuilder<T> {
        BindingSetBuilder {
            name: name.into(),
            source: None,
            setup: None,
            address: None,
        }
    }

    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.borrow().len()
    }

    /// Wire `binding` to this set's source and address, give it `views`,
    /// and activate it.
    ///
    /// # Errors
    ///
    /// `MissingSource` if the set has no source; otherwise whatever the
    /// member's own activation reports.
    pub fn associate<V: BoundView>(
        &self,
        binding: &Rc<Binding<T, V>>,
        views: Vec<V>,
    ) -> Result<(), WiringError> {
        let source = self.source.borrow().clone().ok_or_else(|| WiringError::MissingSource {
            component: self.name.clone(),
        })?;
        binding.set_source(source);
        binding.set_views(views);
        if self.explicit_address.get() {
            binding.mark_explicit_address();
        }
        binding.set_address(self.address.get());
        binding.try_activate()?;

        let member = Rc::clone(binding) as Rc<dyn AddressedBinding>;
        self.members.borrow_mut().push(member);
        Ok(())
    }

    fn members(&self) -> Vec<Rc<dyn AddressedBinding>> {
        self.members.borrow().clone()
    }
}

impl<T: Clone + 'static> Activate for BindingSet<T> {
    fn try_activate(&self) -> Result<(), WiringError> {
        if self.state.get() == BindingState::Active {
            return Ok(());
        }
        if self.source.borrow().is_none() {
            return Err(WiringError::MissingSource {
                component: self.name.clone(),
            });
        }
        self.state.set(BindingState::Wired);
        if !self.explicit_address.get() && self.address.get().is_none() {
            self.address.set(Some(IndexPath::ORIGIN));
        }

        let setup = self.setup.borrow_mut().take();
        if let Some(setup) = setup {
            setup(self)?;
        }
        if self.members.borrow().is_empty() {
            return Err(WiringError::EmptyBindingSet {
                component: self.name.clone(),
            });
        }

        self.state.set(BindingState::Active);
        tracing::debug!(set = %self.name, members = self.member_count(), "binding set active");
        Ok(())
    }
}

impl<T: Clone + 'static> SegueDataProvider for BindingSet<T> {
    fn segue_data(&self) -> Option<AnyReader> {
        let source = self.source.borrow().clone()?;
        source.forward_value(self.address.get())
    }
}

impl<T: Clone + 'static> AddressedBinding for BindingSet<T> {
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
        for member in self.members() {
            member.set_address(at);
        }
    }

    fn reset(&self) {
        for member in self.members() {
            member.reset();
        }
    }

    fn mark_explicit_address(&self) {
        self.explicit_address.set(true);
        for member in self.members() {
            member.mark_explicit_address();
        }
    }
}

/// Declares a [`BindingSet`].
pub struct BindingSetBuilder<T> {
    name: String,
    source: Option<Rc<dyn ValueSource<T>>>,
    setup: Option<SetSetup<T>>,
    address: Option<IndexPath>,
}

impl<T: Clone + 'static> BindingSetBuilder<T> {
    #[must_use]
    pub fn source(self, source: impl ValueSource<T>) -> Self {
        self.source_rc(Rc::new(source))
    }

    #[must_use]
    pub fn source_rc(mut self, source: Rc<dyn ValueSource<T>>) -> Self {
        self.source = Some(source);
        self
    }

    /// The hook that associates members. Runs once, at activation.
    #[must_use]
    pub fn on_setup(
        mut self,
        setup: impl FnOnce(&BindingSet<T>) -> Result<(), WiringError> + 'static,
    ) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }

    #[must_use]
    pub fn address(mut self, at: IndexPath) -> Self {
        self.address = Some(at);
        self
    }

    #[must_use]
    pub fn build(self) -> Rc<BindingSet<T>> {
        Rc::new(BindingSet {
            name: self.name,
            source: RefCell::new(self.source),
            members: RefCell::new(Vec::new()),
            setup: RefCell::new(self.setup),
            address: Cell::new(self.address),
            explicit_address: Cell::new(false),
            state: Cell::new(BindingState::Uninitialized),
        })
    }
}
