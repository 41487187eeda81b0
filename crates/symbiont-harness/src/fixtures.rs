#![forbid(unsafe_code)]

//! Fake list and picker hosts, pagers, responders, and a data source
//! that loads late.

use std::cell::{Cell, RefCell};
use std::rc::Weak;
use std::time::Duration;

use symbiont_runtime::{
    Activate, AnyReader, DataSource, IndexPath, ListHost, OutletReader, Pageable, PickFilter,
    PickerHost, PickerResponder, Receptacle, Responder, Scene, SelectionResponder, WiringError,
    split_list,
};

/// A list view that records every reload.
#[derive(Debug, Default)]
pub struct FakeList {
    reloads: RefCell<Vec<usize>>,
    at_end: Cell<bool>,
}

impl FakeList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Row counts passed to `reload`, oldest first.
    #[must_use]
    pub fn reloads(&self) -> Vec<usize> {
        self.reloads.borrow().clone()
    }

    #[must_use]
    pub fn last_reload(&self) -> Option<usize> {
        self.reloads.borrow().last().copied()
    }

    pub fn scroll_to_end(&self, at_end: bool) {
        self.at_end.set(at_end);
    }
}

impl ListHost for FakeList {
    fn reload(&self, rows: usize) {
        symbiont_core::trace!(rows, "fake list reload");
        self.reloads.borrow_mut().push(rows);
    }

    fn is_scrolled_to_end(&self) -> bool {
        self.at_end.get()
    }
}

/// A picker view that records the rows per component of every reload.
#[derive(Debug, Default)]
pub struct FakePicker {
    reloads: RefCell<Vec<Vec<usize>>>,
}

impl FakePicker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reloads(&self) -> Vec<Vec<usize>> {
        self.reloads.borrow().clone()
    }

    #[must_use]
    pub fn last_reload(&self) -> Option<Vec<usize>> {
        self.reloads.borrow().last().cloned()
    }
}

impl PickerHost for FakePicker {
    fn reload(&self, rows: &[usize]) {
        symbiont_core::trace!(components = rows.len(), "fake picker reload");
        self.reloads.borrow_mut().push(rows.to_vec());
    }
}

/// Records picked items, optionally only for some components and rows.
#[derive(Debug, Default)]
pub struct RecordingPicks {
    filter: PickFilter,
    picks: RefCell<Vec<(String, IndexPath)>>,
}

impl RecordingPicks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only record selections in `components` and `rows`, both
    /// comma-separated index lists.
    #[must_use]
    pub fn limited_to(components: &str, rows: &str) -> Self {
        Self {
            filter: PickFilter::parse(components, rows),
            picks: RefCell::default(),
        }
    }

    #[must_use]
    pub fn picks(&self) -> Vec<(String, IndexPath)> {
        self.picks.borrow().clone()
    }
}

impl PickerResponder for RecordingPicks {
    fn picked(&self, value: &str, at: IndexPath) {
        self.picks.borrow_mut().push((value.to_string(), at));
    }

    fn accepts(&self, at: IndexPath) -> bool {
        self.filter.allows(at)
    }
}

/// A string source whose value arrives only after a delay, for driving
/// loading indicators and timeouts.
///
/// The test value is a comma-separated list. An empty one delivers an
/// empty set, as an endpoint that answered with nothing would. There is
/// no timer: the clock starts at activation and moves only through
/// [`advance`](Self::advance).
#[derive(Debug)]
pub struct DelayedDataSource {
    source: DataSource<String>,
    delay: Duration,
    pending: RefCell<Option<Vec<String>>>,
    elapsed: Cell<Duration>,
    started: Cell<bool>,
}

impl DelayedDataSource {
    #[must_use]
    pub fn new(name: impl Into<String>, delay: Duration, test_value: &str) -> Self {
        Self {
            source: DataSource::new(name),
            delay,
            pending: RefCell::new(Some(split_list(test_value))),
            elapsed: Cell::new(Duration::ZERO),
            started: Cell::new(false),
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.pending.borrow().is_none()
    }

    #[must_use]
    pub fn reader(&self) -> OutletReader<String> {
        self.source.reader()
    }

    #[must_use]
    pub fn erased(&self) -> AnyReader {
        self.source.erased()
    }

    /// Let `by` pass. Returns `true` if this delivered the test value.
    /// Time before activation does not count.
    pub fn advance(&self, by: Duration) -> bool {
        if !self.started.get() {
            return false;
        }
        self.elapsed.set(self.elapsed.get().saturating_add(by));
        self.deliver_if_due()
    }

    fn deliver_if_due(&self) -> bool {
        if self.elapsed.get() < self.delay {
            return false;
        }
        let Some(values) = self.pending.borrow_mut().take() else {
            return false;
        };
        symbiont_core::debug!(
            source = %self.source.name(),
            count = values.len(),
            "delayed value delivered"
        );
        self.source.outlet().set_all(values);
        true
    }
}

impl Activate for DelayedDataSource {
    fn try_activate(&self) -> Result<(), WiringError> {
        self.source.try_activate()?;
        if !self.started.replace(true) {
            self.deliver_if_due();
        }
        Ok(())
    }
}

impl Receptacle for DelayedDataSource {
    fn accepts_forwarded(&self) -> bool {
        self.source.accepts_forwarded()
    }

    /// Forwarded data replaces the test value, which is then never
    /// delivered.
    fn receive_forwarded(&self, data: &AnyReader) -> bool {
        let stored = self.source.receive_forwarded(data);
        if stored {
            self.pending.borrow_mut().take();
        }
        stored
    }
}

type PageHook = Box<dyn Fn(u32)>;

/// A pager with a fixed number of pages left. Each `load_more` uses one
/// and calls the page hook with the page number (starting at 1).
pub struct CountingPager {
    remaining: Cell<u32>,
    loads: Cell<u32>,
    on_load: Option<PageHook>,
}

impl std::fmt::Debug for CountingPager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountingPager")
            .field("remaining", &self.remaining.get())
            .field("loads", &self.loads.get())
            .finish()
    }
}

impl CountingPager {
    #[must_use]
    pub fn new(pages: u32) -> Self {
        Self {
            remaining: Cell::new(pages),
            loads: Cell::new(0),
            on_load: None,
        }
    }

    #[must_use]
    pub fn with_on_load(mut self, hook: impl Fn(u32) + 'static) -> Self {
        self.on_load = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn loads(&self) -> u32 {
        self.loads.get()
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining.get()
    }
}

impl Pageable for CountingPager {
    fn more_available(&self) -> bool {
        self.remaining.get() > 0
    }

    fn load_more(&self) {
        let Some(left) = self.remaining.get().checked_sub(1) else {
            return;
        };
        self.remaining.set(left);
        self.loads.set(self.loads.get() + 1);
        if let Some(hook) = &self.on_load {
            hook(self.loads.get());
        }
    }
}

/// Records selections and its scene attachment.
#[derive(Debug, Default)]
pub struct RecordingResponder {
    selections: RefCell<Vec<IndexPath>>,
    scene: RefCell<Weak<Scene>>,
    initialized: Cell<u32>,
}

impl RecordingResponder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn selections(&self) -> Vec<IndexPath> {
        self.selections.borrow().clone()
    }

    /// Name of the scene this responder was attached to, if it is alive.
    #[must_use]
    pub fn scene_name(&self) -> Option<String> {
        self.scene
            .borrow()
            .upgrade()
            .map(|scene| scene.name().to_string())
    }

    #[must_use]
    pub fn initialized(&self) -> u32 {
        self.initialized.get()
    }
}

impl SelectionResponder for RecordingResponder {
    fn selected(&self, at: IndexPath) {
        self.selections.borrow_mut().push(at);
    }
}

impl Responder for RecordingResponder {
    fn attach(&self, scene: Weak<Scene>) {
        *self.scene.borrow_mut() = scene;
    }

    fn initialize(&self) {
        self.initialized.set(self.initialized.get() + 1);
    }
}
