#![forbid(unsafe_code)]

//! Addressed value sources.
//!
//! A [`ValueSource`] answers "what is the value at this address right now"
//! and tells a [`Refresh`] target whenever that answer may have changed.
//! Bindings read through this trait so they work the same over flat and
//! sectioned outlets.

use std::fmt;
use std::rc::Weak;

use symbiont_core::{Config, IndexPath, SectionFallback};

use super::erased::AnyReader;
use super::outlet::{Outlet, OutletReader, Subscriber, identity_key};

/// Something that recomputes when its source changes.
pub trait Refresh: 'static {
    fn refresh(&self);
}

/// A readable, watchable source of addressed values.
pub trait ValueSource<T>: 'static {
    /// The value at `at`, or `None` if the address is absent or out of range.
    fn value_at(&self, at: Option<IndexPath>) -> Option<T>;

    /// Refresh `target` after every change, and right away if there is
    /// already something to read. Watching the same target twice is a no-op.
    fn watch(&self, target: Weak<dyn Refresh>);

    /// Stop refreshing `target`. A no-op if it was never watching.
    fn unwatch(&self, target: &Weak<dyn Refresh>);

    /// The whole underlying contents, erased.
    fn contents(&self) -> AnyReader;

    /// A fresh outlet holding only the value at `at`.
    fn forward_value(&self, at: Option<IndexPath>) -> Option<AnyReader>
    where
        T: Clone + 'static,
    {
        self.value_at(at)
            .map(|value| Outlet::with_values(vec![value]).reader().erased())
    }
}

impl<T: Clone + 'static> ValueSource<T> for OutletReader<T> {
    fn value_at(&self, at: Option<IndexPath>) -> Option<T> {
        self.get(at)
    }

    fn watch(&self, target: Weak<dyn Refresh>) {
        self.attach_unique(Subscriber::weak(target, |target, _contents| target.refresh()));
    }

    fn unwatch(&self, target: &Weak<dyn Refresh>) {
        self.detach(identity_key(target));
    }

    fn contents(&self) -> AnyReader {
        self.erased()
    }
}

/// A section-of-sections outlet read with nested addressing.
pub struct Sectioned<E> {
    sections: OutletReader<Vec<E>>,
    fallback: SectionFallback,
}

impl<E> Clone for Sectioned<E> {
    fn clone(&self) -> Self {
        Self {
            sections: self.sections.clone(),
            fallback: self.fallback,
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for Sectioned<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sectioned")
            .field("sections", &self.sections)
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl<E: Clone + 'static> Sectioned<E> {
    /// Wrap `sections`, using the process-wide fallback setting.
    #[must_use]
    pub fn new(sections: OutletReader<Vec<E>>) -> Self {
        Self::with_fallback(sections, Config::global().section_fallback)
    }

    #[must_use]
    pub fn with_fallback(sections: OutletReader<Vec<E>>, fallback: SectionFallback) -> Self {
        Self { sections, fallback }
    }

    #[must_use]
    pub fn fallback(&self) -> SectionFallback {
        self.fallback
    }

    /// Number of rows in each section, in order.
    #[must_use]
    pub fn section_lengths(&self) -> Vec<usize> {
        self.sections
            .with(|sections| sections.iter().map(Vec::len).collect())
    }
}

impl<E: Clone + 'static> ValueSource<E> for Sectioned<E> {
    fn value_at(&self, at: Option<IndexPath>) -> Option<E> {
        self.sections.get_nested(at, self.fallback)
    }

    fn watch(&self, target: Weak<dyn Refresh>) {
        ValueSource::watch(&self.sections, target);
    }

    fn unwatch(&self, target: &Weak<dyn Refresh>) {
        ValueSource::unwatch(&self.sections, target);
    }

    fn contents(&self) -> AnyReader {
        self.sections.erased()
    }
}
