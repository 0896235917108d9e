#![forbid(unsafe_code)]

//! Core: pixel geometry, input sensors, and grid settings.
//!
//! # Role in panelgrid
//! `panelgrid-core` is the input layer. It turns host input (mouse, touch,
//! keyboard) into a uniform pointer + sensor abstraction, computes preview
//! rectangles for live gestures, and carries the [`RuntimeSettings`] used to
//! convert pixels into grid cells.
//!
//! # How it fits in the system
//! The runtime (`panelgrid-runtime`) consumes these types while driving
//! gestures; the layout crate (`panelgrid-layout`) never sees pixels.

pub mod geometry;
pub mod sensor;
pub mod settings;

pub use geometry::{PixelRect, PointerPosition, SensorOffsets};
pub use sensor::{
    AnchorCorner, InteractionInput, NavigationKey, PointerKind, SensorType,
    get_drag_preview_rect, get_resize_preview_rect, get_sensor_offsets, keyboard_anchor,
    next_keyboard_pointer,
};
pub use settings::{RuntimeSettings, SettingsError};
