#![forbid(unsafe_code)]

//! Runtime: reactive layout state and gesture state machines.
//!
//! # Role in panelgrid
//! `panelgrid-runtime` turns pointer and keyboard gestures into layout
//! changes. A [`GridLayoutState`] holds the canonical layout, the staged
//! layout of an in-flight panel gesture, and the gesture records, all as
//! [`Observable`]s that views subscribe to. Placement itself is delegated to
//! the pure resolvers in `panelgrid-layout`; pixel input is normalized by
//! `panelgrid-core`.
//!
//! Everything here is single-threaded: one state container per grid, driven
//! synchronously from the host's event loop.

pub mod interaction;
pub mod measure;
mod panel;
pub mod reactive;
mod section;
pub mod state;

pub use interaction::{
    ActivePanel, InteractionOutcome, InteractionPhase, NoopReason, PanelInteraction,
    PanelInteractionKind, SectionDragEvent, Translate,
};
pub use measure::{CanvasPlacement, ElementMeasurer, RectRegistry};
pub use reactive::{Derived, Observable, Subscription};
pub use state::{GridLayoutState, PanelState, StateError};
