#![forbid(unsafe_code)]

//! Type-erased outlet façades.
//!
//! [`AnyReader`] lets code that does not know an outlet's element type count
//! it, copy its contents as `Box<dyn Any>`, and observe it. [`AnyOutlet`]
//! adds an all-or-nothing `try_set`, which is how scene transitions push
//! forwarded data into destinations without naming their types.
//!
//! Both are backed by a small vtable (a private trait object over the typed
//! reader) plus, for setting, a closure that captures the concrete type.
//!
//! # Invariants
//!
//! 1. `try_set` either downcasts every element and replaces the contents, or
//!    changes nothing.
//! 2. Adding the same observer (by `Rc` identity) twice registers it once.
//! 3. An `AnyOutlet` can only be made by the owner of the typed `Outlet`.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::{Rc, Weak};

use symbiont_core::{Config, IndexPath};

use super::outlet::{Outlet, OutletReader, Subscriber, SubscriberKey, identity_key};

/// An observer of type-erased contents.
pub trait ErasedObserver: 'static {
    /// Called after every `set` on the observed outlet.
    fn updated(&self, contents: &AnyReader);
}

/// Which part of an outlet's contents to forward across a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForwardSelection {
    /// A copy of the whole current contents.
    #[default]
    All,
    /// Only the element at this row of section 0.
    Row(usize),
}

trait ErasedRead {
    fn count(&self) -> usize;
    fn version(&self) -> u64;
    fn copy_boxed(&self) -> Vec<Box<dyn Any>>;
    fn value_at(&self, at: IndexPath) -> Option<Box<dyn Any>>;
    fn element_type_name(&self) -> &'static str;
    fn element_type_id(&self) -> TypeId;
    fn add(&self, observer: Weak<dyn ErasedObserver>) -> bool;
    fn remove(&self, key: SubscriberKey);
    fn contains(&self, key: SubscriberKey) -> bool;
    fn forward(&self, selection: ForwardSelection) -> AnyReader;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Clone + 'static> ErasedRead for OutletReader<T> {
    fn count(&self) -> usize {
        OutletReader::count(self)
    }

    fn version(&self) -> u64 {
        OutletReader::version(self)
    }

    fn copy_boxed(&self) -> Vec<Box<dyn Any>> {
        self.snapshot()
            .iter()
            .map(|value| Box::new(value.clone()) as Box<dyn Any>)
            .collect()
    }

    fn value_at(&self, at: IndexPath) -> Option<Box<dyn Any>> {
        self.get(Some(at))
            .map(|value| Box::new(value) as Box<dyn Any>)
    }

    fn element_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn add(&self, observer: Weak<dyn ErasedObserver>) -> bool {
        // Weak back-reference: the outlet must not keep itself alive.
        let home = Rc::downgrade(&self.shared);
        self.attach_unique(Subscriber::weak(observer, move |observer, _contents| {
            if let Some(shared) = home.upgrade() {
                observer.updated(&AnyReader::from_reader(OutletReader { shared }));
            }
        }))
    }

    fn remove(&self, key: SubscriberKey) {
        self.detach(key);
    }

    fn contains(&self, key: SubscriberKey) -> bool {
        self.contains_key(key)
    }

    fn forward(&self, selection: ForwardSelection) -> AnyReader {
        let values = match selection {
            ForwardSelection::All => self.copy(),
            ForwardSelection::Row(row) => self.get(Some(IndexPath::row(row))).into_iter().collect(),
        };
        Outlet::with_values(values).reader().erased()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Non-generic read and observe access to an outlet of some hidden type.
#[derive(Clone)]
pub struct AnyReader {
    inner: Rc<dyn ErasedRead>,
}

impl fmt::Debug for AnyReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyReader")
            .field("element", &self.inner.element_type_name())
            .field("count", &self.inner.count())
            .field("version", &self.inner.version())
            .finish()
    }
}

impl AnyReader {
    pub(crate) fn from_reader<T: Clone + 'static>(reader: OutletReader<T>) -> Self {
        Self {
            inner: Rc::new(reader),
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Number of `set` calls the underlying outlet has seen.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version()
    }

    /// The current contents, boxed.
    #[must_use]
    pub fn copy(&self) -> Vec<Box<dyn Any>> {
        self.inner.copy_boxed()
    }

    /// The element at `at` (flat addressing), boxed.
    #[must_use]
    pub fn value_at(&self, at: IndexPath) -> Option<Box<dyn Any>> {
        self.inner.value_at(at)
    }

    #[must_use]
    pub fn element_type_name(&self) -> &'static str {
        self.inner.element_type_name()
    }

    #[must_use]
    pub fn element_type_id(&self) -> TypeId {
        self.inner.element_type_id()
    }

    /// Whether the hidden element type is `T`.
    #[must_use]
    pub fn holds<T: 'static>(&self) -> bool {
        self.element_type_id() == TypeId::of::<T>()
    }

    /// Recover the typed reader if the hidden element type is `T`.
    #[must_use]
    pub fn typed<T: Clone + 'static>(&self) -> Option<OutletReader<T>> {
        self.inner
            .as_any()
            .downcast_ref::<OutletReader<T>>()
            .cloned()
    }

    /// Register `observer` weakly. Returns `false` if it was already
    /// registered (compared by `Rc` identity). It is notified right away if
    /// the outlet holds values.
    pub fn add<O: ErasedObserver>(&self, observer: &Rc<O>) -> bool {
        let weak = Rc::downgrade(observer) as Weak<dyn ErasedObserver>;
        self.add_weak(weak)
    }

    /// [`add`](Self::add) for an observer already held as a `Weak`.
    pub fn add_weak(&self, observer: Weak<dyn ErasedObserver>) -> bool {
        self.inner.add(observer)
    }

    /// Unregister `observer`. A no-op if it was never added.
    pub fn remove<O: ErasedObserver>(&self, observer: &Rc<O>) {
        let weak = Rc::downgrade(observer) as Weak<dyn ErasedObserver>;
        self.inner.remove(identity_key(&weak));
    }

    #[must_use]
    pub fn contains<O: ErasedObserver>(&self, observer: &Rc<O>) -> bool {
        let weak = Rc::downgrade(observer) as Weak<dyn ErasedObserver>;
        self.inner.contains(identity_key(&weak))
    }

    /// A fresh, independent outlet holding the selected part of the
    /// contents. A row that does not exist yields an empty outlet.
    #[must_use]
    pub fn forward(&self, selection: ForwardSelection) -> AnyReader {
        self.inner.forward(selection)
    }
}

type ErasedSetter = Rc<dyn Fn(Vec<Box<dyn Any>>) -> bool>;

/// A type-erased outlet that can also be set.
///
/// Holds a strong reference to the outlet it wraps. All read methods come
/// from [`AnyReader`] through `Deref`.
#[derive(Clone)]
pub struct AnyOutlet {
    reader: AnyReader,
    setter: ErasedSetter,
}

impl fmt::Debug for AnyOutlet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyOutlet")
            .field("element", &self.reader.element_type_name())
            .field("count", &self.reader.count())
            .finish()
    }
}

impl std::ops::Deref for AnyOutlet {
    type Target = AnyReader;

    fn deref(&self) -> &Self::Target {
        &self.reader
    }
}

impl AnyOutlet {
    pub(crate) fn from_outlet<T: Clone + 'static>(outlet: Outlet<T>) -> Self {
        let reader = outlet.reader().erased();
        let setter: ErasedSetter = Rc::new(move |values| match downcast_all::<T>(values) {
            Some(values) => {
                outlet.set_all(values);
                true
            }
            None => false,
        });
        Self { reader, setter }
    }

    /// Read-only view of this outlet.
    #[must_use]
    pub fn reader(&self) -> AnyReader {
        self.reader.clone()
    }

    /// Replace the contents if every element is of the hidden type.
    ///
    /// A mismatch changes nothing and returns `false`; it is reported as a
    /// diagnostic event, never as an error.
    pub fn try_set(&self, values: Vec<Box<dyn Any>>) -> bool {
        let offered = values.len();
        let applied = (self.setter)(values);
        if !applied {
            self.report_mismatch(offered, None);
        }
        applied
    }

    /// Copy `source`'s contents into this outlet if the element types match.
    ///
    /// The types are compared up front, so an empty source of another type
    /// is rejected too.
    pub fn try_set_from(&self, source: &AnyReader) -> bool {
        let offered = source.count();
        let applied = source.element_type_id() == self.reader.element_type_id()
            && (self.setter)(source.copy());
        if !applied {
            self.report_mismatch(offered, Some(source.element_type_name()));
        }
        applied
    }

    fn report_mismatch(&self, offered: usize, found: Option<&'static str>) {
        let expected = self.reader.element_type_name();
        let found = found.unwrap_or("<mixed>");
        if Config::global().warn_on_type_mismatch {
            tracing::warn!(expected, found, offered, "erased set rejected: element type mismatch");
        } else {
            tracing::debug!(expected, found, offered, "erased set rejected: element type mismatch");
        }
    }
}

fn downcast_all<T: 'static>(values: Vec<Box<dyn Any>>) -> Option<Vec<T>> {
    values
        .into_iter()
        .map(|value| value.downcast::<T>().ok().map(|value| *value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter {
        calls: Cell<u32>,
        last_count: Cell<usize>,
    }

    impl Counter {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                calls: Cell::new(0),
                last_count: Cell::new(0),
            })
        }
    }

    impl ErasedObserver for Counter {
        fn updated(&self, contents: &AnyReader) {
            self.calls.set(self.calls.get() + 1);
            self.last_count.set(contents.count());
        }
    }

    fn boxed<T: 'static>(values: Vec<T>) -> Vec<Box<dyn Any>> {
        values
            .into_iter()
            .map(|v| Box::new(v) as Box<dyn Any>)
            .collect()
    }

    #[test]
    fn count_and_copy() {
        let outlet = Outlet::with_values(vec![1u32, 2, 3]);
        let erased = outlet.erased();
        assert_eq!(erased.count(), 3);
        let copied: Vec<u32> = erased
            .copy()
            .into_iter()
            .map(|b| *b.downcast::<u32>().unwrap())
            .collect();
        assert_eq!(copied, vec![1, 2, 3]);
        assert!(erased.holds::<u32>());
        assert!(!erased.holds::<i32>());
    }

    #[test]
    fn try_set_matching_types() {
        let outlet: Outlet<String> = Outlet::new();
        let erased = outlet.erased();
        assert!(erased.try_set(boxed(vec!["a".to_string(), "b".to_string()])));
        assert_eq!(outlet.copy(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(outlet.version(), 1);
    }

    #[test]
    fn try_set_mixed_types_changes_nothing() {
        let outlet = Outlet::with_values(vec!["keep".to_string()]);
        let erased = outlet.erased();
        let mixed: Vec<Box<dyn Any>> = vec![Box::new("x".to_string()), Box::new(7u8)];
        assert!(!erased.try_set(mixed));
        assert_eq!(outlet.copy(), vec!["keep".to_string()]);
        assert_eq!(outlet.version(), 0);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn mismatch_emits_diagnostic_event() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let outlet: Outlet<u32> = Outlet::new();
        let erased = outlet.erased();
        tracing::subscriber::with_default(subscriber, || {
            assert!(!erased.try_set(boxed(vec!["seven"])));
        });

        let log = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(log.contains("element type mismatch"));
        assert!(log.contains("u32"));
    }

    #[test]
    fn try_set_from_other_outlet() {
        let from = Outlet::with_values(vec![4i64, 5]);
        let to: Outlet<i64> = Outlet::new();
        assert!(to.erased().try_set_from(&from.erased()));
        assert_eq!(to.copy(), vec![4, 5]);

        let wrong = Outlet::with_values(vec!["nope"]);
        assert!(!to.erased().try_set_from(&wrong.erased()));
        assert_eq!(to.copy(), vec![4, 5]);
    }

    #[test]
    fn try_set_from_empty_source_of_other_type_changes_nothing() {
        let to = Outlet::with_values(vec!["keep".to_string()]);
        let empty: Outlet<u32> = Outlet::new();
        assert!(!to.erased().try_set_from(&empty.erased()));
        assert_eq!(to.copy(), vec!["keep".to_string()]);
        assert_eq!(to.version(), 0);

        let same: Outlet<String> = Outlet::new();
        assert!(to.erased().try_set_from(&same.erased()));
        assert!(to.is_empty());
    }

    #[test]
    fn duplicate_observer_notified_once() {
        let outlet: Outlet<u8> = Outlet::new();
        let erased = outlet.erased();
        let counter = Counter::new();

        assert!(erased.add(&counter));
        assert!(!erased.add(&counter));
        assert!(erased.contains(&counter));

        outlet.set_all(vec![1, 2]);
        assert_eq!(counter.calls.get(), 1);
        assert_eq!(counter.last_count.get(), 2);
    }

    #[test]
    fn remove_observer() {
        let outlet: Outlet<u8> = Outlet::new();
        let erased = outlet.erased();
        let counter = Counter::new();
        erased.add(&counter);
        erased.remove(&counter);
        assert!(!erased.contains(&counter));

        outlet.set(1);
        assert_eq!(counter.calls.get(), 0);
    }

    #[test]
    fn added_observer_sees_current_contents() {
        let outlet = Outlet::with_values(vec!['a', 'b', 'c']);
        let counter = Counter::new();
        outlet.erased().add(&counter);
        assert_eq!(counter.calls.get(), 1);
        assert_eq!(counter.last_count.get(), 3);
    }

    #[test]
    fn dropped_observer_not_invoked() {
        let outlet: Outlet<u8> = Outlet::new();
        let counter = Counter::new();
        outlet.erased().add(&counter);
        drop(counter);
        outlet.set(1);
        assert_eq!(outlet.subscriber_count(), 0);
    }

    #[test]
    fn forward_all_is_independent() {
        let outlet = Outlet::with_values(vec![1, 2, 3]);
        let forwarded = outlet.erased().forward(ForwardSelection::All);
        outlet.set_all(vec![9]);
        assert_eq!(forwarded.count(), 3);
    }

    #[test]
    fn forward_single_row() {
        let outlet = Outlet::with_values(vec!["x", "y", "z"]);
        let erased = outlet.erased();
        let row = erased.forward(ForwardSelection::Row(1));
        assert_eq!(row.typed::<&'static str>().unwrap().copy(), vec!["y"]);

        let missing = erased.forward(ForwardSelection::Row(10));
        assert!(missing.is_empty());
    }

    #[test]
    fn typed_recovers_reader() {
        let outlet = Outlet::with_values(vec![1.5f32]);
        let erased = outlet.erased();
        assert!(erased.typed::<f64>().is_none());
        let reader = erased.typed::<f32>().unwrap();
        outlet.set(2.5);
        assert_eq!(reader.first(), Some(2.5));
    }

    #[test]
    fn value_at_uses_flat_addressing() {
        let outlet = Outlet::with_values(vec![10u16, 20]);
        let erased = outlet.erased();
        let value = erased.value_at(IndexPath::row(1)).unwrap();
        assert_eq!(*value.downcast::<u16>().unwrap(), 20);
        assert!(erased.value_at(IndexPath::new(1, 0)).is_none());
    }
}
