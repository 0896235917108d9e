#![forbid(unsafe_code)]

//! Layout model and the pure resolvers behind every gesture.
//!
//! # Role in panelgrid
//! `panelgrid-layout` owns the canonical [`Layout`] shape (sections holding
//! panels on an integer grid) and the deterministic functions that keep it
//! valid: per-section collision resolution and compaction ([`resolve`]),
//! section normalization and splitting ([`sections`]), geometry-only
//! equality ([`equality`]), and host edits ([`edit`]).
//!
//! Nothing here knows about pixels, pointers, or observers; the runtime
//! crate converts gestures into requests and feeds them through these
//! functions.

pub mod edit;
pub mod equality;
pub mod model;
pub mod resolve;
pub mod sections;

pub use edit::{
    EditError, RemoveSectionPolicy, add_panel, add_panel_at_bottom, add_section,
    prune_empty_main_sections, remove_panel, remove_section, rename_section,
    set_section_collapsed,
};
pub use equality::{is_grid_data_equal, is_layout_equal, is_section_equal};
pub use model::{
    GridCoordinate, Layout, LayoutError, LayoutIssue, LayoutIssueCode, LayoutReport, Panel,
    PanelId, PanelMap, Section, SectionId,
};
pub use resolve::{collides, compact_section, find_overlaps, panel_ids_in_order, resolve_section};
pub use sections::{
    MAIN_SECTION_PREFIX, next_main_section_id, reorder_sections, resolve_sections,
    section_ids_in_order, split_section_at_row,
};
