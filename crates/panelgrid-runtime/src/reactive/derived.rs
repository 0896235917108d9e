//! Projections of an observable that only fire when the projection changes.

use super::observable::{Observable, Subscription};

/// An [`Observable<U>`] kept in sync with a source observable.
///
/// Each source change is mapped through `map`; the result is stored only if
/// `eq` says it differs from the current projection, so subscribers of a
/// `Derived` never see a change that is irrelevant to them. Dropping the
/// `Derived` detaches it from the source.
pub struct Derived<U> {
    output: Observable<U>,
    _upstream: Subscription,
}

impl<U: std::fmt::Debug> std::fmt::Debug for Derived<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derived")
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

impl<U: Clone + 'static> Derived<U> {
    /// Project `source` through `map`, de-duplicating with `eq`.
    pub fn new<T: Clone + 'static>(
        source: &Observable<T>,
        map: impl Fn(&T) -> U + 'static,
        eq: impl Fn(&U, &U) -> bool + 'static,
    ) -> Self {
        let output = Observable::new(source.with(&map));
        let sink = output.clone();
        let upstream = source.subscribe(move |value| {
            sink.set_with(map(value), &eq);
        });
        Self {
            output,
            _upstream: upstream,
        }
    }

    /// Current projection.
    #[must_use]
    pub fn get(&self) -> U {
        self.output.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&U) -> R) -> R {
        self.output.with(f)
    }

    /// Subscribe to changes of the projection.
    pub fn subscribe(&self, callback: impl Fn(&U) + 'static) -> Subscription {
        self.output.subscribe(callback)
    }

    /// Subscribe and receive the current projection immediately.
    pub fn watch(&self, callback: impl Fn(&U) + 'static) -> Subscription {
        self.output.watch(callback)
    }

    /// Number of times the projection changed.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.output.version()
    }

    /// The underlying observable, for chaining further projections.
    #[must_use]
    pub fn observable(&self) -> &Observable<U> {
        &self.output
    }
}

impl<U: Clone + PartialEq + 'static> Derived<U> {
    /// Project `source` through `map`, de-duplicating with `PartialEq`.
    pub fn map<T: Clone + 'static>(
        source: &Observable<T>,
        map: impl Fn(&T) -> U + 'static,
    ) -> Self {
        Self::new(source, map, U::eq)
    }
}
