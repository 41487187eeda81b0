#![forbid(unsafe_code)]

//! Driving a list view from an outlet.
//!
//! A [`ListBinding`] observes an erased outlet and keeps a [`ListHost`]
//! informed of the row count. Rows are displayed through
//! [`ReusableCell`]s handed back by [`dequeue`](ListBinding::dequeue), and
//! reaching the end of the list asks a [`Pageable`] source for more.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use symbiont_core::{IndexPath, WiringError};

use crate::lifecycle::{Activate, Pageable, ReusableCell, SegueDataProvider, SelectionResponder};
use crate::reactive::{AnyReader, ErasedObserver, ForwardSelection};

/// The toolkit's list view, as seen by a list binding.
pub trait ListHost: 'static {
    /// Show `rows` rows and redisplay them.
    fn reload(&self, rows: usize);

    /// Whether the last row is currently on screen.
    fn is_scrolled_to_end(&self) -> bool {
        false
    }
}

/// Keeps a list view in step with an outlet.
pub struct ListBinding {
    name: String,
    this: Weak<Self>,
    source: Option<AnyReader>,
    host: Option<Rc<dyn ListHost>>,
    pager: Option<Rc<dyn Pageable>>,
    responders: RefCell<Vec<Weak<dyn SelectionResponder>>>,
    rows: Cell<usize>,
    selected: Cell<Option<IndexPath>>,
    active: Cell<bool>,
}

impl fmt::Debug for ListBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListBinding")
            .field("name", &self.name)
            .field("rows", &self.rows.get())
            .field("selected", &self.selected.get())
            .field("active", &self.active.get())
            .field("pageable", &self.pager.is_some())
            .finish()
    }
}

impl ListBinding {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ListBindingBuilder {
        ListBindingBuilder {
            name: name.into(),
            source: None,
            host: None,
            pager: None,
            responders: Vec::new(),
        }
    }

    /// Rows reported to the host by the last update.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.get()
    }

    #[must_use]
    pub fn selected(&self) -> Option<IndexPath> {
        self.selected.get()
    }

    /// Prepare `cell` to display row `at`.
    ///
    /// # Errors
    ///
    /// Whatever activating the cell's bindings reports.
    pub fn dequeue<'c>(
        &self,
        cell: &'c ReusableCell,
        at: IndexPath,
    ) -> Result<&'c ReusableCell, WiringError> {
        cell.prepare(at)?;
        Ok(cell)
    }

    /// The host scrolled; fetch more if it reached the end.
    pub fn did_scroll(&self) {
        self.load_more_if_needed();
    }

    /// A row was tapped. Remembered for forwarding and passed to every
    /// live selection responder.
    pub fn select(&self, at: IndexPath) {
        self.selected.set(Some(at));
        let responders: Vec<_> = {
            let mut responders = self.responders.borrow_mut();
            responders.retain(|r| r.strong_count() > 0);
            responders.iter().filter_map(Weak::upgrade).collect()
        };
        tracing::debug!(list = %self.name, %at, responders = responders.len(), "row selected");
        for responder in responders {
            responder.selected(at);
        }
    }

    pub fn add_responder<R: SelectionResponder>(&self, responder: &Rc<R>) {
        let weak = Rc::downgrade(responder) as Weak<dyn SelectionResponder>;
        self.responders.borrow_mut().push(weak);
    }

    fn load_more_if_needed(&self) {
        let (Some(host), Some(pager)) = (&self.host, &self.pager) else {
            return;
        };
        if host.is_scrolled_to_end() && pager.more_available() {
            tracing::debug!(list = %self.name, rows = self.rows.get(), "loading more rows");
            pager.load_more();
        }
    }
}

impl ErasedObserver for ListBinding {
    fn updated(&self, contents: &AnyReader) {
        let rows = contents.count();
        self.rows.set(rows);
        if let Some(host) = &self.host {
            host.reload(rows);
        }
        self.load_more_if_needed();
    }
}

impl Activate for ListBinding {
    fn try_activate(&self) -> Result<(), WiringError> {
        if self.active.get() {
            return Ok(());
        }
        let Some(host) = &self.host else {
            return Err(WiringError::MissingListView {
                component: self.name.clone(),
            });
        };
        let Some(source) = &self.source else {
            return Err(WiringError::MissingSource {
                component: self.name.clone(),
            });
        };
        self.active.set(true);

        let observer: Weak<dyn ErasedObserver> = self.this.clone();
        source.add_weak(observer);
        // A non-empty source reloads through `updated` right away.
        if source.is_empty() {
            host.reload(0);
        }
        tracing::debug!(list = %self.name, rows = self.rows.get(), "list binding active");
        Ok(())
    }
}

impl SegueDataProvider for ListBinding {
    /// The selected row if there is one, otherwise everything.
    fn segue_data(&self) -> Option<AnyReader> {
        let source = self.source.as_ref()?;
        let selection = match self.selected.get() {
            Some(at) => ForwardSelection::Row(at.row),
            None => ForwardSelection::All,
        };
        Some(source.forward(selection))
    }
}

/// Declares a [`ListBinding`].
pub struct ListBindingBuilder {
    name: String,
    source: Option<AnyReader>,
    host: Option<Rc<dyn ListHost>>,
    pager: Option<Rc<dyn Pageable>>,
    responders: Vec<Weak<dyn SelectionResponder>>,
}

impl ListBindingBuilder {
    #[must_use]
    pub fn source(mut self, source: AnyReader) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn host(mut self, host: Rc<dyn ListHost>) -> Self {
        self.host = Some(host);
        self
    }

    #[must_use]
    pub fn pager(mut self, pager: Rc<dyn Pageable>) -> Self {
        self.pager = Some(pager);
        self
    }

    /// Held weakly.
    #[must_use]
    pub fn responder<R: SelectionResponder>(mut self, responder: &Rc<R>) -> Self {
        let weak = Rc::downgrade(responder) as Weak<dyn SelectionResponder>;
        self.responders.push(weak);
        self
    }

    #[must_use]
    pub fn build(self) -> Rc<ListBinding> {
        Rc::new_cyclic(|this| ListBinding {
            name: self.name,
            this: this.clone(),
            source: self.source,
            host: self.host,
            pager: self.pager,
            responders: RefCell::new(self.responders),
            rows: Cell::new(0),
            selected: Cell::new(None),
            active: Cell::new(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Outlet;

    #[derive(Default)]
    struct Host {
        reloads: RefCell<Vec<usize>>,
        at_end: Cell<bool>,
    }

    impl ListHost for Host {
        fn reload(&self, rows: usize) {
            self.reloads.borrow_mut().push(rows);
        }

        fn is_scrolled_to_end(&self) -> bool {
            self.at_end.get()
        }
    }

    #[derive(Default)]
    struct Pager {
        more: Cell<bool>,
        loads: Cell<u32>,
    }

    impl Pageable for Pager {
        fn more_available(&self) -> bool {
            self.more.get()
        }

        fn load_more(&self) {
            self.loads.set(self.loads.get() + 1);
        }
    }

    #[derive(Default)]
    struct Picks(RefCell<Vec<IndexPath>>);

    impl SelectionResponder for Picks {
        fn selected(&self, at: IndexPath) {
            self.0.borrow_mut().push(at);
        }
    }

    #[test]
    fn missing_host_and_source() {
        let outlet: Outlet<u8> = Outlet::new();
        let list = ListBinding::builder("a").source(outlet.reader().erased()).build();
        assert!(matches!(
            list.try_activate(),
            Err(WiringError::MissingListView { .. })
        ));

        let list = ListBinding::builder("b").host(Rc::new(Host::default())).build();
        assert!(matches!(
            list.try_activate(),
            Err(WiringError::MissingSource { .. })
        ));
    }

    #[test]
    fn reloads_on_every_set() {
        let outlet = Outlet::with_values(vec![1u8, 2]);
        let host = Rc::new(Host::default());
        let list = ListBinding::builder("numbers")
            .source(outlet.reader().erased())
            .host(host.clone())
            .build();
        list.activate();
        assert_eq!(list.row_count(), 2);

        outlet.set_all(vec![1, 2, 3, 4]);
        outlet.set_all(Vec::new());
        assert_eq!(*host.reloads.borrow(), vec![2, 4, 0]);
        assert_eq!(list.row_count(), 0);
    }

    #[test]
    fn empty_source_reloads_zero_rows() {
        let outlet: Outlet<u8> = Outlet::new();
        let host = Rc::new(Host::default());
        let list = ListBinding::builder("empty")
            .source(outlet.reader().erased())
            .host(host.clone())
            .build();
        list.activate();
        list.activate();
        assert_eq!(*host.reloads.borrow(), vec![0]);
    }

    #[test]
    fn loads_more_only_at_end_with_more_available() {
        let outlet = Outlet::with_values(vec![1u8]);
        let host = Rc::new(Host::default());
        let pager = Rc::new(Pager::default());
        let list = ListBinding::builder("feed")
            .source(outlet.reader().erased())
            .host(host.clone())
            .pager(pager.clone())
            .build();
        list.activate();

        list.did_scroll();
        assert_eq!(pager.loads.get(), 0);

        host.at_end.set(true);
        list.did_scroll();
        assert_eq!(pager.loads.get(), 0);

        pager.more.set(true);
        list.did_scroll();
        assert_eq!(pager.loads.get(), 1);

        outlet.set_all(vec![1, 2]);
        assert_eq!(pager.loads.get(), 2);
    }

    #[test]
    fn selection_reaches_responders_and_segue() {
        let outlet = Outlet::with_values(vec!["a", "b", "c"]);
        let picks = Rc::new(Picks::default());
        let list = ListBinding::builder("letters")
            .source(outlet.reader().erased())
            .host(Rc::new(Host::default()))
            .responder(&picks)
            .build();
        list.activate();

        let all = list.segue_data().unwrap();
        assert_eq!(all.count(), 3);

        list.select(IndexPath::row(2));
        assert_eq!(*picks.0.borrow(), vec![IndexPath::row(2)]);
        assert_eq!(list.selected(), Some(IndexPath::row(2)));
        let one = list.segue_data().unwrap();
        assert_eq!(one.typed::<&'static str>().unwrap().copy(), vec!["c"]);
    }

    #[test]
    fn dropped_responder_is_skipped() {
        let outlet = Outlet::with_values(vec![0u8]);
        let list = ListBinding::builder("l")
            .source(outlet.reader().erased())
            .host(Rc::new(Host::default()))
            .build();
        let picks = Rc::new(Picks::default());
        list.add_responder(&picks);
        drop(picks);
        list.select(IndexPath::ORIGIN);
        assert_eq!(list.selected(), Some(IndexPath::ORIGIN));
    }
}
