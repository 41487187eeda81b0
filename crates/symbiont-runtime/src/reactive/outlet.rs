#![forbid(unsafe_code)]

//! Observable outlet: a typed, replace-all sequence with change notification.
//!
//! # Design
//!
//! [`Outlet<T>`] owns an ordered sequence of `T` in shared, reference-counted
//! storage (`Rc<RefCell<..>>`). The sequence itself is an `Rc<[T]>` that is
//! swapped wholesale on every `set`, so an observer never sees a partially
//! replaced sequence and a snapshot handed out earlier is never mutated.
//!
//! The outlet is the producer's handle and is deliberately not `Clone`.
//! Consumers get an [`OutletReader<T>`], which can read and subscribe but
//! has no mutation entry point.
//!
//! # Performance
//!
//! | Operation     | Complexity                          |
//! |---------------|-------------------------------------|
//! | `get()`       | O(1)                                |
//! | `set_all()`   | O(S) where S = subscribers          |
//! | `subscribe()` | O(1) amortized (+1 immediate call)  |
//! | `copy()`      | O(N) clone of the contents          |
//! | `snapshot()`  | O(1) (`Rc` clone)                   |
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: If [`Subscription`] guards are stored indefinitely
//!   without being dropped, callbacks accumulate. Dead weak references are
//!   cleaned lazily during notification.
//! - **Re-entrant set**: Calling `set` from inside a subscriber is allowed.
//!   The nested set notifies everyone with the newer contents before the
//!   outer notification continues delivering the older snapshot.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use symbiont_core::{Config, IndexPath, SectionFallback, resolve, resolve_nested};

use super::erased::{AnyOutlet, AnyReader};

/// A typed observer of an outlet's contents.
///
/// Registered through [`OutletReader::observe`], which holds the observer
/// weakly: dropping the last `Rc` to the observer is the unsubscribe.
pub trait Observer<T>: 'static {
    /// Called with the full current contents after every `set`.
    fn updated(&self, contents: &[T]);
}

/// Identity of a subscriber: the address of the observed allocation.
pub(crate) type SubscriberKey = usize;

pub(crate) fn identity_key<O: ?Sized>(target: &Weak<O>) -> SubscriberKey {
    target.as_ptr().cast::<()>() as usize
}

/// A non-owning subscriber entry: identity, liveness check, notify closure.
pub(crate) struct Subscriber<T> {
    key: SubscriberKey,
    is_alive: Box<dyn Fn() -> bool>,
    notify: Box<dyn Fn(&[T])>,
}

impl<T: 'static> Subscriber<T> {
    /// Build an entry that forwards to `target` for as long as it lives.
    pub(crate) fn weak<O>(target: Weak<O>, notify: impl Fn(&O, &[T]) + 'static) -> Self
    where
        O: ?Sized + 'static,
    {
        let key = identity_key(&target);
        let watched = target.clone();
        Self {
            key,
            is_alive: Box::new(move || watched.strong_count() > 0),
            notify: Box::new(move |contents| {
                if let Some(target) = target.upgrade() {
                    notify(&*target, contents);
                }
            }),
        }
    }
}

/// Shared interior for an outlet and all of its readers.
pub(crate) struct OutletInner<T> {
    contents: Rc<[T]>,
    version: u64,
    /// Subscribers held weakly. Dead entries are pruned on notify.
    subscribers: Vec<Rc<Subscriber<T>>>,
}

/// Read and observe access to an outlet.
///
/// Cloning a reader creates another handle to the **same** outlet. A reader
/// can never change the outlet's contents.
pub struct OutletReader<T> {
    pub(crate) shared: Rc<RefCell<OutletInner<T>>>,
}

impl<T> Clone for OutletReader<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for OutletReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.borrow();
        f.debug_struct("OutletReader")
            .field("contents", &&*inner.contents)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: 'static> OutletReader<T> {
    /// Number of values currently held.
    #[must_use]
    pub fn count(&self) -> usize {
        self.shared.borrow().contents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Number of `set` calls so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.shared.borrow().version
    }

    /// Number of registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.borrow().subscribers.len()
    }

    /// The current contents as a shared, immutable slice.
    ///
    /// Later `set` calls replace the outlet's slice; they never touch one
    /// that was already handed out.
    #[must_use]
    pub fn snapshot(&self) -> Rc<[T]> {
        Rc::clone(&self.shared.borrow().contents)
    }

    /// Access the current contents by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let contents = self.snapshot();
        f(&contents[..])
    }

    /// Subscribe a callback. It runs once right away if the outlet already
    /// holds values, then after every `set`.
    ///
    /// Returns a [`Subscription`] guard. Dropping the guard unsubscribes
    /// the callback (it will not be called after drop, though it may still
    /// be in the subscriber list until the next notification prunes it).
    pub fn subscribe(&self, callback: impl Fn(&[T]) + 'static) -> Subscription {
        let strong: Rc<dyn Fn(&[T])> = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.attach(Subscriber::weak(weak, |callback, contents| callback(contents)));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Register a weakly-held typed observer. It is notified right away if
    /// the outlet already holds values.
    pub fn observe<O: Observer<T>>(&self, observer: &Rc<O>) {
        let weak = Rc::downgrade(observer);
        self.attach(Subscriber::weak(weak, |observer, contents| {
            observer.updated(contents);
        }));
    }

    /// Append a subscriber and give it the current contents if non-empty.
    pub(crate) fn attach(&self, subscriber: Subscriber<T>) {
        let subscriber = Rc::new(subscriber);
        let contents = {
            let mut inner = self.shared.borrow_mut();
            inner.subscribers.push(Rc::clone(&subscriber));
            Rc::clone(&inner.contents)
        };
        if !contents.is_empty() {
            (subscriber.notify)(&contents[..]);
        }
    }

    /// Like [`attach`](Self::attach), unless a live subscriber with the same
    /// identity is already registered. Returns whether it was added.
    pub(crate) fn attach_unique(&self, subscriber: Subscriber<T>) -> bool {
        if self.contains_key(subscriber.key) {
            return false;
        }
        self.attach(subscriber);
        true
    }

    pub(crate) fn contains_key(&self, key: SubscriberKey) -> bool {
        self.shared
            .borrow()
            .subscribers
            .iter()
            .any(|s| s.key == key && (s.is_alive)())
    }

    pub(crate) fn detach(&self, key: SubscriberKey) {
        self.shared
            .borrow_mut()
            .subscribers
            .retain(|s| s.key != key);
    }

    /// Create a type-erased read façade over this outlet.
    #[must_use]
    pub fn erased(&self) -> AnyReader
    where
        T: Clone,
    {
        AnyReader::from_reader(self.clone())
    }
}

impl<T: Clone + 'static> OutletReader<T> {
    /// Value at `at` in flat contents, or `None` when the address is absent,
    /// out of range, or not in section 0.
    #[must_use]
    pub fn get(&self, at: Option<IndexPath>) -> Option<T> {
        let contents = self.snapshot();
        resolve(&contents[..], at).cloned()
    }

    /// First value, if any.
    #[must_use]
    pub fn first(&self) -> Option<T> {
        self.get(Some(IndexPath::ORIGIN))
    }

    /// A copy of the contents, decoupled from future mutation.
    #[must_use]
    pub fn copy(&self) -> Vec<T> {
        self.snapshot().to_vec()
    }
}

impl<E: Clone + 'static> OutletReader<Vec<E>> {
    /// Value at `at` in nested contents: section first, then row.
    #[must_use]
    pub fn get_nested(&self, at: Option<IndexPath>, fallback: SectionFallback) -> Option<E> {
        let contents = self.snapshot();
        resolve_nested(&contents[..], at, fallback).cloned()
    }
}

/// The producer's handle to an observable sequence.
///
/// Only the owning component holds an `Outlet`; it hands out
/// [`OutletReader`]s (and, when it chooses, a settable [`AnyOutlet`]) to
/// everyone else. All read methods are available through `Deref`.
///
/// # Invariants
///
/// 1. `set`/`set_all` replace the contents wholesale, then notify.
/// 2. `version` increments by exactly 1 on every `set`, equal contents or not.
/// 3. Subscribers are notified in registration order, exactly once per `set`.
/// 4. Dead subscribers are never invoked and are pruned lazily.
pub struct Outlet<T> {
    reader: OutletReader<T>,
}

impl<T: fmt::Debug> fmt::Debug for Outlet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.reader.shared.borrow();
        f.debug_struct("Outlet")
            .field("contents", &&*inner.contents)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: 'static> Default for Outlet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::ops::Deref for Outlet<T> {
    type Target = OutletReader<T>;

    fn deref(&self) -> &Self::Target {
        &self.reader
    }
}

impl<T: 'static> Outlet<T> {
    /// Create an empty outlet. The initial version is 0.
    #[must_use]
    pub fn new() -> Self {
        Self::with_values(Vec::new())
    }

    /// Create an outlet holding `values` without notifying anyone.
    #[must_use]
    pub fn with_values(values: Vec<T>) -> Self {
        Self {
            reader: OutletReader {
                shared: Rc::new(RefCell::new(OutletInner {
                    contents: Rc::from(values),
                    version: 0,
                    subscribers: Vec::new(),
                })),
            },
        }
    }

    /// A read-only handle for consumers.
    #[must_use]
    pub fn reader(&self) -> OutletReader<T> {
        self.reader.clone()
    }

    /// Replace the contents with the single `value` and notify.
    pub fn set(&self, value: T) {
        self.set_all(vec![value]);
    }

    /// Replace the contents with `values` and notify. Never fails; an empty
    /// vector is a valid new state.
    pub fn set_all(&self, values: Vec<T>) {
        {
            let mut inner = self.reader.shared.borrow_mut();
            inner.contents = Rc::from(values);
            inner.version += 1;
        }
        self.notify();
    }

    /// Create a type-erased, settable façade over this outlet.
    #[must_use]
    pub fn erased(&self) -> AnyOutlet
    where
        T: Clone,
    {
        AnyOutlet::from_outlet(Self {
            reader: self.reader.clone(),
        })
    }

    /// Notify live subscribers and prune dead ones.
    fn notify(&self) {
        // Collect live subscribers first (to avoid holding the borrow during calls).
        let (contents, subscribers, version) = {
            let mut inner = self.reader.shared.borrow_mut();
            inner.subscribers.retain(|s| (s.is_alive)());
            (
                Rc::clone(&inner.contents),
                inner.subscribers.clone(),
                inner.version,
            )
        };

        if Config::global().trace_notifications {
            tracing::trace!(
                element = std::any::type_name::<T>(),
                count = contents.len(),
                version,
                subscribers = subscribers.len(),
                "outlet notify"
            );
        }

        for subscriber in &subscribers {
            (subscriber.notify)(&contents[..]);
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the `Subscription` causes the associated callback to become
/// unreachable (the strong `Rc` is dropped, so the weak entry in the
/// outlet's subscriber list fails its liveness check on the next
/// notification cycle).
pub struct Subscription {
    /// Type-erased strong reference keeping the callback `Rc` alive.
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn set_replaces_contents() {
        let outlet: Outlet<i32> = Outlet::new();
        assert_eq!(outlet.count(), 0);
        assert_eq!(outlet.version(), 0);

        outlet.set_all(vec![1, 2, 3]);
        assert_eq!(outlet.copy(), vec![1, 2, 3]);
        assert_eq!(outlet.version(), 1);

        outlet.set(9);
        assert_eq!(outlet.copy(), vec![9]);
        assert_eq!(outlet.version(), 2);
    }

    #[test]
    fn set_empty_is_valid() {
        let outlet = Outlet::with_values(vec!["a"]);
        outlet.set_all(Vec::new());
        assert!(outlet.is_empty());
        assert_eq!(outlet.first(), None);
    }

    #[test]
    fn equal_contents_still_notify() {
        let outlet: Outlet<i32> = Outlet::new();
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let _sub = outlet.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        outlet.set(5);
        outlet.set(5);
        assert_eq!(count.get(), 2);
        assert_eq!(outlet.version(), 2);
    }

    #[test]
    fn late_subscriber_gets_current_contents() {
        let outlet = Outlet::with_values(vec!["x", "y"]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);

        let _sub = outlet.subscribe(move |contents| seen_clone.borrow_mut().push(contents.len()));
        assert_eq!(*seen.borrow(), vec![2]);

        outlet.set("z");
        assert_eq!(*seen.borrow(), vec![2, 1]);
    }

    #[test]
    fn empty_outlet_does_not_call_new_subscriber() {
        let outlet: Outlet<u8> = Outlet::new();
        let called = Rc::new(Cell::new(false));
        let called_clone = Rc::clone(&called);
        let _sub = outlet.subscribe(move |_| called_clone.set(true));
        assert!(!called.get());
    }

    #[test]
    fn subscription_drop_unsubscribes() {
        let outlet: Outlet<i32> = Outlet::new();
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);

        let sub = outlet.subscribe(move |_| count_clone.set(count_clone.get() + 1));
        outlet.set(1);
        assert_eq!(count.get(), 1);

        drop(sub);
        outlet.set(2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn dead_subscribers_pruned_lazily() {
        let outlet: Outlet<i32> = Outlet::new();
        let _s1 = outlet.subscribe(|_: &[i32]| {});
        let s2 = outlet.subscribe(|_: &[i32]| {});
        assert_eq!(outlet.subscriber_count(), 2);

        drop(s2);
        // Dead subscriber not yet pruned.
        assert_eq!(outlet.subscriber_count(), 2);

        outlet.set(1);
        assert_eq!(outlet.subscriber_count(), 1);
    }

    #[test]
    fn notification_order_is_registration_order() {
        let outlet: Outlet<u8> = Outlet::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let log1 = Rc::clone(&log);
        let _s1 = outlet.subscribe(move |_: &[u8]| log1.borrow_mut().push('A'));
        let log2 = Rc::clone(&log);
        let _s2 = outlet.subscribe(move |_: &[u8]| log2.borrow_mut().push('B'));
        let log3 = Rc::clone(&log);
        let _s3 = outlet.subscribe(move |_: &[u8]| log3.borrow_mut().push('C'));

        outlet.set(1);
        assert_eq!(*log.borrow(), vec!['A', 'B', 'C']);
    }

    struct Recorder {
        seen: RefCell<Vec<Vec<String>>>,
    }

    impl Observer<String> for Recorder {
        fn updated(&self, contents: &[String]) {
            self.seen.borrow_mut().push(contents.to_vec());
        }
    }

    #[test]
    fn typed_observer_is_weak() {
        let outlet: Outlet<String> = Outlet::new();
        let recorder = Rc::new(Recorder {
            seen: RefCell::new(Vec::new()),
        });
        outlet.observe(&recorder);

        outlet.set("one".to_string());
        assert_eq!(recorder.seen.borrow().len(), 1);

        let weak = Rc::downgrade(&recorder);
        drop(recorder);
        assert!(weak.upgrade().is_none());

        outlet.set("two".to_string());
        assert_eq!(outlet.subscriber_count(), 0);
    }

    #[test]
    fn reader_sees_owner_sets() {
        let outlet: Outlet<i32> = Outlet::new();
        let reader = outlet.reader();
        outlet.set_all(vec![10, 20]);
        assert_eq!(reader.count(), 2);
        assert_eq!(reader.get(Some(IndexPath::row(1))), Some(20));
        assert_eq!(reader.get(Some(IndexPath::new(1, 0))), None);
        assert_eq!(reader.get(None), None);
    }

    #[test]
    fn snapshot_is_decoupled_from_later_sets() {
        let outlet = Outlet::with_values(vec![1, 2]);
        let before = outlet.snapshot();
        let copy = outlet.copy();
        outlet.set_all(vec![3]);
        assert_eq!(&before[..], &[1, 2]);
        assert_eq!(copy, vec![1, 2]);
        assert_eq!(outlet.copy(), vec![3]);
    }

    #[test]
    fn nested_lookup_with_fallback() {
        let outlet = Outlet::with_values(vec![vec!["a", "b"], vec!["c"]]);
        let reader = outlet.reader();
        let at = Some(IndexPath::new(1, 5));
        assert_eq!(reader.get_nested(at, SectionFallback::FirstOfSection), Some("c"));
        assert_eq!(reader.get_nested(at, SectionFallback::Strict), None);
        assert_eq!(
            reader.get_nested(Some(IndexPath::new(2, 0)), SectionFallback::FirstOfSection),
            None
        );
    }

    #[test]
    fn subscriber_may_read_during_notification() {
        let outlet: Outlet<u8> = Outlet::new();
        let reader = outlet.reader();
        let observed = Rc::new(Cell::new(0usize));
        let observed_clone = Rc::clone(&observed);
        let _sub = outlet.subscribe(move |_: &[u8]| observed_clone.set(reader.count()));
        outlet.set_all(vec![1, 2, 3]);
        assert_eq!(observed.get(), 3);
    }

    #[test]
    fn subscriber_dropped_mid_notification_is_skipped() {
        let outlet: Outlet<u8> = Outlet::new();
        let second_calls = Rc::new(Cell::new(0u32));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let slot_clone = Rc::clone(&slot);
        let _first = outlet.subscribe(move |_: &[u8]| {
            slot_clone.borrow_mut().take();
        });
        let calls = Rc::clone(&second_calls);
        *slot.borrow_mut() = Some(outlet.subscribe(move |_: &[u8]| calls.set(calls.get() + 1)));

        outlet.set(1);
        assert_eq!(second_calls.get(), 0);
    }

    #[test]
    fn debug_format() {
        let outlet = Outlet::with_values(vec![42]);
        let dbg = format!("{outlet:?}");
        assert!(dbg.contains("Outlet"));
        assert!(dbg.contains("42"));
        assert!(dbg.contains("version"));
    }
}
