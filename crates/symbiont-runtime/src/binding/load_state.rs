#![forbid(unsafe_code)]

//! Showing and hiding views as data arrives.
//!
//! A [`LoadStateBinding`] watches one or more outlets. Until all of them
//! have loaded it keeps the "loading" views visible and the content views
//! hidden; when they load it swaps them, once. The host may report that
//! its timer ran out, which reveals the timeout views (an error banner, a
//! retry button) unless loading already finished.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use symbiont_core::WiringError;

use crate::lifecycle::Activate;
use crate::reactive::{AnyReader, ErasedObserver};

/// A view that can be hidden.
pub trait Hideable: 'static {
    fn set_hidden(&self, hidden: bool);
}

pub struct LoadStateBinding {
    name: String,
    this: Weak<Self>,
    sources: Vec<AnyReader>,
    views_to_hide: Vec<Rc<dyn Hideable>>,
    views_to_unhide: Vec<Rc<dyn Hideable>>,
    timeout_views: Vec<Rc<dyn Hideable>>,
    timeout: Option<Duration>,
    allow_empty: bool,
    loaded: Cell<bool>,
    timed_out: Cell<bool>,
    active: Cell<bool>,
}

impl fmt::Debug for LoadStateBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadStateBinding")
            .field("name", &self.name)
            .field("sources", &self.sources.len())
            .field("timeout", &self.timeout)
            .field("allow_empty", &self.allow_empty)
            .field("loaded", &self.loaded.get())
            .field("timed_out", &self.timed_out.get())
            .finish()
    }
}

impl LoadStateBinding {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoadStateBuilder {
        LoadStateBuilder {
            name: name.into(),
            sources: Vec::new(),
            views_to_hide: Vec::new(),
            views_to_unhide: Vec::new(),
            timeout_views: Vec::new(),
            timeout: None,
            allow_empty: true,
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    #[must_use]
    pub fn has_timed_out(&self) -> bool {
        self.timed_out.get()
    }

    /// How long the host should wait before calling
    /// [`timeout_elapsed`](Self::timeout_elapsed).
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The host's timer ran out. Reveals the timeout views unless the data
    /// already loaded.
    pub fn timeout_elapsed(&self) {
        if self.loaded.get() || self.timed_out.replace(true) {
            return;
        }
        tracing::debug!(binding = %self.name, "load timed out");
        set_all_hidden(&self.timeout_views, false);
    }

    fn source_loaded(&self, source: &AnyReader) -> bool {
        if self.allow_empty {
            source.version() > 0 || !source.is_empty()
        } else {
            !source.is_empty()
        }
    }

    fn check(&self) {
        if self.loaded.get() || !self.sources.iter().all(|s| self.source_loaded(s)) {
            return;
        }
        self.loaded.set(true);
        tracing::debug!(binding = %self.name, timed_out = self.timed_out.get(), "data loaded");
        set_all_hidden(&self.views_to_hide, true);
        set_all_hidden(&self.views_to_unhide, false);
        set_all_hidden(&self.timeout_views, true);
    }
}

fn set_all_hidden(views: &[Rc<dyn Hideable>], hidden: bool) {
    for view in views {
        view.set_hidden(hidden);
    }
}

impl ErasedObserver for LoadStateBinding {
    fn updated(&self, _contents: &AnyReader) {
        self.check();
    }
}

impl Activate for LoadStateBinding {
    fn try_activate(&self) -> Result<(), WiringError> {
        if self.active.get() {
            return Ok(());
        }
        if self.sources.is_empty() {
            return Err(WiringError::MissingSource {
                component: self.name.clone(),
            });
        }
        if self.views_to_hide.is_empty()
            && self.views_to_unhide.is_empty()
            && self.timeout_views.is_empty()
        {
            return Err(WiringError::MissingViews {
                component: self.name.clone(),
            });
        }
        self.active.set(true);

        set_all_hidden(&self.views_to_hide, false);
        set_all_hidden(&self.views_to_unhide, true);
        set_all_hidden(&self.timeout_views, true);

        for source in &self.sources {
            let observer: Weak<dyn ErasedObserver> = self.this.clone();
            source.add_weak(observer);
        }
        // Sources that are loaded but empty-and-allowed never call back.
        self.check();
        Ok(())
    }
}

/// Declares a [`LoadStateBinding`].
pub struct LoadStateBuilder {
    name: String,
    sources: Vec<AnyReader>,
    views_to_hide: Vec<Rc<dyn Hideable>>,
    views_to_unhide: Vec<Rc<dyn Hideable>>,
    timeout_views: Vec<Rc<dyn Hideable>>,
    timeout: Option<Duration>,
    allow_empty: bool,
}

impl LoadStateBuilder {
    #[must_use]
    pub fn source(mut self, source: AnyReader) -> Self {
        self.sources.push(source);
        self
    }

    /// Visible while loading, hidden once loaded.
    #[must_use]
    pub fn hide_on_load(mut self, view: impl Hideable) -> Self {
        self.views_to_hide.push(Rc::new(view));
        self
    }

    /// Hidden while loading, shown once loaded.
    #[must_use]
    pub fn unhide_on_load(mut self, view: impl Hideable) -> Self {
        self.views_to_unhide.push(Rc::new(view));
        self
    }

    /// Shown if the timeout elapses first.
    #[must_use]
    pub fn show_on_timeout(mut self, view: impl Hideable) -> Self {
        self.timeout_views.push(Rc::new(view));
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Count an outlet that was set to empty as loaded. On by default; when
    /// off, a source must hold at least one value to count.
    #[must_use]
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    #[must_use]
    pub fn build(self) -> Rc<LoadStateBinding> {
        Rc::new_cyclic(|this| LoadStateBinding {
            name: self.name,
            this: this.clone(),
            sources: self.sources,
            views_to_hide: self.views_to_hide,
            views_to_unhide: self.views_to_unhide,
            timeout_views: self.timeout_views,
            timeout: self.timeout,
            allow_empty: self.allow_empty,
            loaded: Cell::new(false),
            timed_out: Cell::new(false),
            active: Cell::new(false),
        })
    }
}
