//! Section ordering, splitting, and merging.
//!
//! Section gestures leave the section map in intermediate shapes: sparse
//! `order` values, a main section split in two around a dropped header, or
//! two main sections that became neighbours after a named section moved
//! away. [`resolve_sections`] turns any of those back into a normalized
//! layout.
//!
//! # Invariants after [`resolve_sections`]
//!
//! 1. `order` values are exactly `0..N-1`.
//! 2. No main section is empty.
//! 3. No two main sections are adjacent.
//! 4. Every named section keeps its id; a main section keeps its id unless
//!    it was merged into the main section directly above it.

use crate::model::{Layout, PanelMap, Section, SectionId};
use crate::resolve::{compact_section, panel_ids_in_order};

/// Prefix of synthetic main section ids.
pub const MAIN_SECTION_PREFIX: &str = "main-";

/// Section ids in display order.
#[must_use]
pub fn section_ids_in_order(layout: &Layout) -> Vec<SectionId> {
    layout
        .sections_in_order()
        .into_iter()
        .map(|section| section.id.clone())
        .collect()
}

/// First `main-{n}` id not used by any section.
#[must_use]
pub fn next_main_section_id(layout: &Layout) -> SectionId {
    (0..)
        .map(|n| format!("{MAIN_SECTION_PREFIX}{n}"))
        .find(|id| !layout.contains_section(id))
        .map(SectionId::from)
        .unwrap_or_else(|| SectionId::from(MAIN_SECTION_PREFIX))
}

/// Normalize section order, dropping empty main sections and merging
/// adjacent ones.
///
/// When two main sections meet, the lower one's panels are stacked below the
/// upper one's and the merged section is compacted.
#[must_use]
pub fn resolve_sections(layout: &Layout) -> Layout {
    let mut resolved: Vec<Section> = Vec::with_capacity(layout.len());

    for section in layout.sections_in_order() {
        if section.is_main_section && section.panels.is_empty() {
            continue;
        }
        if section.is_main_section {
            if let Some(previous) = resolved.last_mut().filter(|s| s.is_main_section) {
                let offset = previous.height();
                for panel in section.panels.values() {
                    let mut moved = panel.clone();
                    moved.row += offset;
                    previous.panels.insert(moved.id.clone(), moved);
                }
                previous.panels = compact_section(&previous.panels);
                continue;
            }
        }
        resolved.push(section.clone());
    }

    for (order, section) in resolved.iter_mut().enumerate() {
        section.order = order;
    }
    Layout::from_sections(resolved)
}

/// Assign `order` by position in `ordered_ids`.
///
/// Sections missing from `ordered_ids` keep their relative order after the
/// listed ones; unknown ids are ignored.
#[must_use]
pub fn reorder_sections(layout: &Layout, ordered_ids: &[SectionId]) -> Layout {
    let mut sequence: Vec<SectionId> = ordered_ids
        .iter()
        .filter(|id| layout.contains_section(id.as_str()))
        .cloned()
        .collect();
    for id in section_ids_in_order(layout) {
        if !sequence.contains(&id) {
            sequence.push(id);
        }
    }

    let mut next = layout.clone();
    for (order, id) in sequence.iter().enumerate() {
        if let Some(section) = next.section_mut(id.as_str()) {
            section.order = order;
        }
    }
    next
}

/// Drop section `dragged` into main section `target` at grid row `row`.
///
/// `target` is split into an upper fragment (panels starting above `row`,
/// unchanged) and a lower fragment (the rest, shifted so its first row is 0),
/// and `dragged` is placed between them. The upper fragment keeps `target`'s
/// id; the lower one gets a fresh main section id (or `target`'s id when the
/// upper fragment is empty). The result is passed through
/// [`resolve_sections`].
///
/// Returns an unchanged copy when `target` is not a main section or either
/// id is unknown.
#[must_use]
pub fn split_section_at_row(layout: &Layout, target: &str, row: u32, dragged: &str) -> Layout {
    let (Some(target_section), Some(dragged_section)) =
        (layout.section(target), layout.section(dragged))
    else {
        return layout.clone();
    };
    if !target_section.is_main_section || target == dragged {
        return layout.clone();
    }

    let mut upper = PanelMap::new();
    let mut lower = PanelMap::new();
    let mut starting_row = None;
    for id in panel_ids_in_order(&target_section.panels, None) {
        let Some(panel) = target_section.panels.get(&id) else {
            continue;
        };
        if panel.row < row {
            upper.insert(id, panel.clone());
        } else {
            let start = *starting_row.get_or_insert(panel.row);
            let mut shifted = panel.clone();
            shifted.row -= start;
            lower.insert(id, shifted);
        }
    }

    let lower_id = if upper.is_empty() {
        target_section.id.clone()
    } else {
        next_main_section_id(layout)
    };

    let mut sequence: Vec<Section> = Vec::with_capacity(layout.len() + 1);
    for section in layout.sections_in_order() {
        if section.id.as_str() == dragged {
            continue;
        }
        if section.id.as_str() != target {
            sequence.push(section.clone());
            continue;
        }
        if !upper.is_empty() {
            sequence.push(Section {
                panels: compact_section(&upper),
                ..section.clone()
            });
        }
        sequence.push(dragged_section.clone());
        if !lower.is_empty() {
            sequence.push(Section {
                id: lower_id.clone(),
                panels: compact_section(&lower),
                ..section.clone()
            });
        }
    }

    for (order, section) in sequence.iter_mut().enumerate() {
        section.order = order;
    }
    resolve_sections(&Layout::from_sections(sequence))
}
