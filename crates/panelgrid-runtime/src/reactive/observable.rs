#![forbid(unsafe_code)]

//! Observable value wrapper with change notification and version tracking.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a value of type `T` in shared, reference-counted
//! storage (`Rc<RefCell<..>>`). When the value changes (by `PartialEq`, or by
//! the equality passed to [`Observable::set_with`]), all live subscribers are
//! notified synchronously in registration order.
//!
//! Late subscribers that need the current value use [`Observable::watch`],
//! which delivers it immediately before any future change.
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: if `Subscription` guards are stored indefinitely
//!   without being dropped, callbacks accumulate. Dead weak references are
//!   cleaned lazily during `notify()`.
//! - **Feedback loops**: a subscriber that writes back a value that never
//!   compares equal recurses without bound. Equality gating is what keeps
//!   derived writes finite.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, info_span};
use web_time::Instant;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    /// Dead entries are pruned on notify.
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` creates a new handle to the **same** inner state.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing write.
/// 2. A write equal to the current value is a no-op: no version bump, no
///    notification.
/// 3. Subscribers are notified in registration order, after the new value
///    is stored, so a subscriber reading the observable sees the new value.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Default + Clone + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Create a new observable with the given initial value.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Store `value` unless `eq(current, value)` holds.
    ///
    /// Returns whether the value changed (and subscribers were notified).
    pub fn set_with(&self, value: T, eq: impl Fn(&T, &T) -> bool) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if eq(&inner.value, &value) {
                return false;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
        true
    }

    /// Subscribe to value changes.
    ///
    /// Returns a [`Subscription`] guard. Dropping the guard unsubscribes the
    /// callback.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.inner.borrow_mut().subscribers.push(weak);
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Like [`subscribe`](Self::subscribe), but `callback` also receives the
    /// current value right away.
    pub fn watch(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let current = self.get();
        callback(&current);
        self.subscribe(callback)
    }

    /// Current version number.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(|w| w.upgrade())
                .collect()
        };

        if callbacks.is_empty() {
            return;
        }

        let (value, version) = {
            let inner = self.inner.borrow();
            (inner.value.clone(), inner.version)
        };
        let subscribers = callbacks.len() as u64;
        let started = Instant::now();
        let _span = info_span!(
            "panelgrid.notify",
            version,
            subscribers,
            duration_us = tracing::field::Empty
        )
        .entered();

        for cb in &callbacks {
            cb(&value);
        }

        let duration_us = started.elapsed().as_micros() as u64;
        tracing::Span::current().record("duration_us", duration_us);
        debug!(duration_us, subscribers, "observable propagated");
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Set a new value, notifying subscribers if it differs from the current
    /// one.
    pub fn set(&self, value: T) -> bool {
        self.set_with(value, T::eq)
    }

    /// Modify the value in place. Subscribers are notified if the result
    /// differs from a snapshot taken before `f` ran.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let old = inner.value.clone();
            f(&mut inner.value);
            if inner.value != old {
                inner.version += 1;
                true
            } else {
                false
            }
        };
        if changed {
            self.notify();
        }
        changed
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping it makes the callback unreachable; the observable prunes the
/// dead entry on its next notification.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};

    #[derive(Default)]
    struct NotifySpanVisitor {
        subscribers: Option<u64>,
        version: Option<u64>,
    }

    impl Visit for NotifySpanVisitor {
        fn record_u64(&mut self, field: &Field, value: u64) {
            match field.name() {
                "subscribers" => self.subscribers = Some(value),
                "version" => self.version = Some(value),
                _ => {}
            }
        }

        fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
    }

    struct NotifySpanSubscriber {
        next_id: AtomicU64,
        spans: Arc<Mutex<Vec<(u64, u64)>>>,
    }

    impl tracing::Subscriber for NotifySpanSubscriber {
        fn enabled(&self, _metadata: &tracing::Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, attrs: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            if attrs.metadata().name() == "panelgrid.notify" {
                let mut visitor = NotifySpanVisitor::default();
                attrs.record(&mut visitor);
                self.spans.lock().expect("span capture lock").push((
                    visitor.version.unwrap_or(0),
                    visitor.subscribers.unwrap_or(0),
                ));
            }
            tracing::span::Id::from_u64(self.next_id.fetch_add(1, Ordering::Relaxed))
        }

        fn record(&self, _span: &tracing::span::Id, _values: &tracing::span::Record<'_>) {}

        fn record_follows_from(&self, _span: &tracing::span::Id, _follows: &tracing::span::Id) {}

        fn event(&self, _event: &tracing::Event<'_>) {}

        fn enter(&self, _span: &tracing::span::Id) {}

        fn exit(&self, _span: &tracing::span::Id) {}
    }

    fn capture_notify_spans(run: impl FnOnce()) -> Vec<(u64, u64)> {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let subscriber = NotifySpanSubscriber {
            next_id: AtomicU64::new(1),
            spans: Arc::clone(&spans),
        };
        let _guard = tracing::subscriber::set_default(subscriber);
        run();
        spans.lock().expect("span capture lock").clone()
    }

    #[test]
    fn get_set_basic() {
        let obs = Observable::new(42);
        assert_eq!(obs.get(), 42);
        assert_eq!(obs.version(), 0);

        assert!(obs.set(99));
        assert_eq!(obs.get(), 99);
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn equal_write_is_a_noop() {
        let obs = Observable::new(42);
        let hits = Rc::new(Cell::new(0u32));
        let hits_clone = Rc::clone(&hits);
        let _sub = obs.subscribe(move |_| hits_clone.set(hits_clone.get() + 1));

        assert!(!obs.set(42));
        assert_eq!(obs.version(), 0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn set_with_uses_custom_equality() {
        let obs = Observable::new((1, 10u8));
        let same_key = |a: &(i32, u8), b: &(i32, u8)| a.0 == b.0;

        assert!(!obs.set_with((1, 20), same_key));
        assert_eq!(obs.get(), (1, 10));
        assert!(obs.set_with((2, 20), same_key));
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn update_mutates_in_place() {
        let obs = Observable::new(vec![1, 2, 3]);
        assert!(obs.update(|v| v.push(4)));
        assert_eq!(obs.get(), vec![1, 2, 3, 4]);
        assert!(!obs.update(|v| v[0] = 1));
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn subscriber_sees_stored_value() {
        let obs = Observable::new(0);
        let reader = obs.clone();
        let seen = Rc::new(Cell::new((0, 0)));
        let seen_clone = Rc::clone(&seen);
        let _sub = obs.subscribe(move |v| seen_clone.set((*v, reader.get())));

        obs.set(7);
        assert_eq!(seen.get(), (7, 7));
    }

    #[test]
    fn watch_delivers_current_value_first() {
        let obs = Observable::new(5);
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let _sub = obs.watch(move |v| log_clone.borrow_mut().push(*v));

        obs.set(6);
        assert_eq!(*log.borrow(), vec![5, 6]);
    }

    #[test]
    fn subscription_drop_unsubscribes() {
        let obs = Observable::new(0);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let sub = obs.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        obs.set(1);
        drop(sub);
        obs.set(2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn dead_subscribers_are_pruned_on_notify() {
        let obs = Observable::new(0);
        let _s1 = obs.subscribe(|_| {});
        let s2 = obs.subscribe(|_| {});
        assert_eq!(obs.subscriber_count(), 2);

        drop(s2);
        assert_eq!(obs.subscriber_count(), 2);
        obs.set(1);
        assert_eq!(obs.subscriber_count(), 1);
    }

    #[test]
    fn notification_order_is_registration_order() {
        let obs = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let log1 = Rc::clone(&log);
        let _s1 = obs.subscribe(move |_| log1.borrow_mut().push('A'));
        let log2 = Rc::clone(&log);
        let _s2 = obs.subscribe(move |_| log2.borrow_mut().push('B'));
        let log3 = Rc::clone(&log);
        let _s3 = obs.subscribe(move |_| log3.borrow_mut().push('C'));

        obs.set(1);
        assert_eq!(*log.borrow(), vec!['A', 'B', 'C']);
    }

    #[test]
    fn clone_shares_state_and_subscribers() {
        let obs1 = Observable::new(0);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let _sub = obs1.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        let obs2 = obs1.clone();
        obs2.set(42);
        assert_eq!(obs1.get(), 42);
        assert_eq!(obs1.version(), 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn subscriber_may_write_to_another_observable() {
        let source = Observable::new(1);
        let sink = Observable::new(0);
        let sink_clone = sink.clone();
        let _sub = source.subscribe(move |v| {
            sink_clone.set(*v * 10);
        });

        source.set(3);
        assert_eq!(sink.get(), 30);
    }

    #[test]
    fn debug_format() {
        let dbg = format!("{:?}", Observable::new(42));
        assert!(dbg.contains("Observable"));
        assert!(dbg.contains("42"));
        assert!(dbg.contains("version"));
    }

    #[test]
    fn unobserved_writes_emit_no_span() {
        let obs = Observable::new(0);
        let spans = capture_notify_spans(|| {
            obs.set(1);
        });
        assert!(spans.is_empty());
    }

    #[test]
    fn notify_span_reports_version_and_subscribers() {
        let obs = Observable::new(0);
        let _a = obs.subscribe(|_| {});
        let _b = obs.subscribe(|_| {});
        let spans = capture_notify_spans(|| {
            obs.set(1);
        });
        assert_eq!(spans, vec![(1, 2)]);
    }
}
