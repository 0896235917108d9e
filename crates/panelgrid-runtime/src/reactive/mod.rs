//! Push-based reactive primitives.
//!
//! [`Observable`] is a shared current-value holder with synchronous,
//! equality-gated change notification; [`Derived`] keeps a projection of an
//! observable in sync and only fires when the projection itself changes.

pub mod derived;
pub mod observable;

pub use derived::Derived;
pub use observable::{Observable, Subscription};
