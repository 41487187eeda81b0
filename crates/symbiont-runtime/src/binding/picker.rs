#![forbid(unsafe_code)]

//! Driving a picker (spinning-wheel) view.
//!
//! A picker shows one or more components side by side, each a column of
//! rows. A [`PickerBinding`] reads its items either from a sectioned
//! outlet, where each section is one component, or from a fixed
//! comma-separated list shown as a single component. Selections are
//! addressed as `IndexPath { section: component, row }`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use symbiont_core::{IndexPath, SectionFallback, WiringError};

use crate::lifecycle::{Activate, SegueDataProvider, split_list};
use crate::reactive::{
    AnyReader, ForwardSelection, Outlet, OutletReader, Refresh, Sectioned, ValueSource,
};

/// The toolkit's picker view, as seen by a picker binding.
pub trait PickerHost: 'static {
    /// Show `rows[c]` rows in component `c` and redisplay.
    fn reload(&self, rows: &[usize]);
}

/// Notified when a picker item is selected.
pub trait PickerResponder: 'static {
    fn picked(&self, value: &str, at: IndexPath);

    /// Whether to run for a selection at `at`. Every selection by default.
    fn accepts(&self, at: IndexPath) -> bool {
        let _ = at;
        true
    }
}

/// Limits a responder to some components and rows.
///
/// Both lists are comma-separated indices. An empty list allows
/// everything; items that are not indices are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickFilter {
    components: Vec<usize>,
    rows: Vec<usize>,
}

impl PickFilter {
    #[must_use]
    pub fn parse(components: &str, rows: &str) -> Self {
        Self {
            components: parse_indices(components),
            rows: parse_indices(rows),
        }
    }

    #[must_use]
    pub fn allows(&self, at: IndexPath) -> bool {
        (self.components.is_empty() || self.components.contains(&at.section))
            && (self.rows.is_empty() || self.rows.contains(&at.row))
    }
}

fn parse_indices(list: &str) -> Vec<usize> {
    split_list(list)
        .iter()
        .filter_map(|item| item.parse().ok())
        .collect()
}

enum Items {
    Sections(Sectioned<String>),
    Fixed(Vec<String>),
}

impl Items {
    fn lengths(&self) -> Vec<usize> {
        match self {
            Self::Sections(sections) => sections.section_lengths(),
            Self::Fixed(values) => vec![values.len()],
        }
    }

    fn value_at(&self, at: IndexPath) -> Option<String> {
        match self {
            Self::Sections(sections) => sections.value_at(Some(at)),
            Self::Fixed(values) => symbiont_core::resolve(values.as_slice(), Some(at)).cloned(),
        }
    }
}

/// Keeps a picker view in step with its items.
pub struct PickerBinding {
    name: String,
    this: Weak<Self>,
    items: Option<Items>,
    host: Option<Rc<dyn PickerHost>>,
    responders: RefCell<Vec<Weak<dyn PickerResponder>>>,
    components: RefCell<Vec<usize>>,
    selected: Cell<Option<IndexPath>>,
    active: Cell<bool>,
}

impl fmt::Debug for PickerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerBinding")
            .field("name", &self.name)
            .field("components", &self.components.borrow())
            .field("selected", &self.selected.get())
            .field("active", &self.active.get())
            .finish()
    }
}

impl PickerBinding {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> PickerBindingBuilder {
        PickerBindingBuilder {
            name: name.into(),
            items: None,
            host: None,
            responders: Vec::new(),
        }
    }

    /// Rows per component reported to the host by the last reload.
    #[must_use]
    pub fn component_rows(&self) -> Vec<usize> {
        self.components.borrow().clone()
    }

    #[must_use]
    pub fn selected(&self) -> Option<IndexPath> {
        self.selected.get()
    }

    /// The item shown at `at`, if there is one.
    #[must_use]
    pub fn value_at(&self, at: IndexPath) -> Option<String> {
        self.items.as_ref()?.value_at(at)
    }

    /// An item was selected. Selections of addresses with no item are
    /// ignored; otherwise every live responder that accepts `at` runs.
    pub fn select(&self, at: IndexPath) {
        let Some(value) = self.value_at(at) else {
            tracing::debug!(picker = %self.name, %at, "selection outside the items ignored");
            return;
        };
        self.selected.set(Some(at));
        let responders: Vec<_> = {
            let mut responders = self.responders.borrow_mut();
            responders.retain(|r| r.strong_count() > 0);
            responders.iter().filter_map(Weak::upgrade).collect()
        };
        tracing::debug!(picker = %self.name, %at, %value, "item picked");
        for responder in responders.iter().filter(|r| r.accepts(at)) {
            responder.picked(&value, at);
        }
    }

    pub fn add_responder<R: PickerResponder>(&self, responder: &Rc<R>) {
        let weak = Rc::downgrade(responder) as Weak<dyn PickerResponder>;
        self.responders.borrow_mut().push(weak);
    }

    fn reload(&self) {
        let Some(items) = &self.items else {
            return;
        };
        let lengths = items.lengths();
        if let Some(at) = self.selected.get() {
            if items.value_at(at).is_none() {
                self.selected.set(None);
            }
        }
        if let Some(host) = &self.host {
            host.reload(&lengths);
        }
        *self.components.borrow_mut() = lengths;
    }
}

impl Refresh for PickerBinding {
    fn refresh(&self) {
        self.reload();
    }
}

impl Activate for PickerBinding {
    fn try_activate(&self) -> Result<(), WiringError> {
        if self.active.get() {
            return Ok(());
        }
        if self.host.is_none() {
            return Err(WiringError::MissingPickerView {
                component: self.name.clone(),
            });
        }
        let Some(items) = &self.items else {
            return Err(WiringError::MissingSource {
                component: self.name.clone(),
            });
        };
        self.active.set(true);

        match items {
            Items::Sections(sections) => {
                let target: Weak<dyn Refresh> = self.this.clone();
                sections.watch(target);
                // A non-empty source reloads through `refresh` right away.
                if sections.contents().is_empty() {
                    self.reload();
                }
            }
            Items::Fixed(_) => self.reload(),
        }
        tracing::debug!(picker = %self.name, components = ?self.component_rows(), "picker binding active");
        Ok(())
    }
}

impl SegueDataProvider for PickerBinding {
    /// The selected item if there is one, otherwise every item.
    fn segue_data(&self) -> Option<AnyReader> {
        let items = self.items.as_ref()?;
        if let Some(at) = self.selected.get() {
            let value = items.value_at(at)?;
            return Some(Outlet::with_values(vec![value]).reader().erased());
        }
        Some(match items {
            Items::Sections(sections) => sections.contents().forward(ForwardSelection::All),
            Items::Fixed(values) => Outlet::with_values(values.clone()).reader().erased(),
        })
    }
}

/// Declares a [`PickerBinding`].
pub struct PickerBindingBuilder {
    name: String,
    items: Option<Items>,
    host: Option<Rc<dyn PickerHost>>,
    responders: Vec<Weak<dyn PickerResponder>>,
}

impl PickerBindingBuilder {
    /// One component per section of `sections`. Rows past the end of a
    /// component have no item.
    #[must_use]
    pub fn source(mut self, sections: OutletReader<Vec<String>>) -> Self {
        self.items = Some(Items::Sections(Sectioned::with_fallback(
            sections,
            SectionFallback::Strict,
        )));
        self
    }

    /// A single fixed component from a comma-separated list. Replaces any
    /// source.
    #[must_use]
    pub fn values(mut self, list: &str) -> Self {
        self.items = Some(Items::Fixed(split_list(list)));
        self
    }

    #[must_use]
    pub fn host(mut self, host: Rc<dyn PickerHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Held weakly.
    #[must_use]
    pub fn responder<R: PickerResponder>(mut self, responder: &Rc<R>) -> Self {
        let weak = Rc::downgrade(responder) as Weak<dyn PickerResponder>;
        self.responders.push(weak);
        self
    }

    #[must_use]
    pub fn build(self) -> Rc<PickerBinding> {
        Rc::new_cyclic(|this| PickerBinding {
            name: self.name,
            this: this.clone(),
            items: self.items,
            host: self.host,
            responders: RefCell::new(self.responders),
            components: RefCell::new(Vec::new()),
            selected: Cell::new(None),
            active: Cell::new(false),
        })
    }
}
