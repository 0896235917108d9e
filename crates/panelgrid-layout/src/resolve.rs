//! Collision resolution and vertical compaction for one section.
//!
//! # Algorithm
//!
//! 1. Insert the requested panel (if any), replacing its previous entry.
//! 2. Place panels top to bottom ([`panel_ids_in_order`]). Each panel keeps
//!    its row if it clears every panel placed before it, otherwise it slides
//!    down past the lowest bottom edge it hits until it fits. Every panel is
//!    checked against all earlier ones, so the walk leaves no overlaps
//!    behind even when the input overlapped in several places.
//! 3. Compact ([`compact_section`]): each panel drops to the highest free
//!    row above it. Passes repeat until nothing moves.
//!
//! # Invariants
//!
//! 1. No two panels of the output overlap.
//! 2. No panel can move to any smaller row without overlapping another.
//! 3. Widths, heights, and columns are never changed.
//! 4. Resolving an already-resolved section without a request is the
//!    identity.
//!
//! Columns are assumed valid; clamping to the grid happens before a request
//! reaches the resolver.

use std::cmp::Ordering;

use crate::model::{GridCoordinate, Panel, PanelId, PanelMap};

/// Whether two distinct panels overlap.
#[inline]
#[must_use]
pub fn collides(a: &Panel, b: &Panel) -> bool {
    a.id != b.id && a.coordinate().overlaps(&b.coordinate())
}

/// All overlapping pairs, each reported once as `(smaller id, larger id)`.
#[must_use]
pub fn find_overlaps(panels: &PanelMap) -> Vec<(PanelId, PanelId)> {
    let list: Vec<&Panel> = panels.values().collect();
    let mut pairs = Vec::new();
    for (index, a) in list.iter().enumerate() {
        for b in &list[index + 1..] {
            if collides(a, b) {
                pairs.push((a.id.clone(), b.id.clone()));
            }
        }
    }
    pairs
}

/// Panel ids sorted top to bottom, then left to right.
///
/// On equal rows the `priority` panel (the one being dragged or resized)
/// comes first, so it wins collisions with neighbours on its own row.
#[must_use]
pub fn panel_ids_in_order(panels: &PanelMap, priority: Option<&PanelId>) -> Vec<PanelId> {
    let mut ordered: Vec<&Panel> = panels.values().collect();
    ordered.sort_by(|a, b| {
        a.row
            .cmp(&b.row)
            .then_with(|| match priority {
                Some(id) => (&b.id == id).cmp(&(&a.id == id)),
                None => Ordering::Equal,
            })
            .then_with(|| a.column.cmp(&b.column))
            .then_with(|| a.id.cmp(&b.id))
    });
    ordered.into_iter().map(|panel| panel.id.clone()).collect()
}

/// Resolve a section so no panels overlap and all rows are compacted.
///
/// With `requested`, that panel is placed at its requested coordinate first
/// (replacing any entry with the same id). Without it this is a pure
/// compaction pass, used to close the gap a departing panel leaves.
#[must_use]
pub fn resolve_section(panels: &PanelMap, requested: Option<&Panel>) -> PanelMap {
    let mut next = panels.clone();
    if let Some(request) = requested {
        next.insert(request.id.clone(), request.clone());
    }

    let order = panel_ids_in_order(&next, requested.map(|panel| &panel.id));
    let mut placed: Vec<GridCoordinate> = Vec::with_capacity(order.len());
    for id in &order {
        let Some(panel) = next.get_mut(id) else {
            continue;
        };
        panel.row = lowest_free_row(&placed, panel.coordinate());
        placed.push(panel.coordinate());
    }

    compact_section(&next)
}

/// Apply gravity: move every panel to the highest row it fits in.
#[must_use]
pub fn compact_section(panels: &PanelMap) -> PanelMap {
    let mut next = panels.clone();
    loop {
        let mut moved = false;
        for id in panel_ids_in_order(&next, None) {
            let Some(target) = next
                .get(&id)
                .map(|panel| highest_free_row(&next, panel))
            else {
                continue;
            };
            if let Some(panel) = next.get_mut(&id) {
                if target < panel.row {
                    panel.row = target;
                    moved = true;
                }
            }
        }
        if !moved {
            return next;
        }
    }
}

/// First row at or below `coordinate.row` where `coordinate` clears every
/// rectangle in `placed`.
fn lowest_free_row(placed: &[GridCoordinate], coordinate: GridCoordinate) -> u32 {
    let mut candidate = coordinate;
    loop {
        let blocker = placed
            .iter()
            .filter(|other| candidate.overlaps(other))
            .map(GridCoordinate::bottom)
            .max();
        match blocker {
            Some(bottom) => candidate.row = bottom,
            None => return candidate.row,
        }
    }
}

/// Smallest row at or above `panel.row` where `panel` overlaps nothing.
fn highest_free_row(panels: &PanelMap, panel: &Panel) -> u32 {
    (0..panel.row)
        .find(|&row| {
            let candidate = GridCoordinate {
                row,
                ..panel.coordinate()
            };
            panels
                .values()
                .all(|other| other.id == panel.id || !candidate.overlaps(&other.coordinate()))
        })
        .unwrap_or(panel.row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(id: &str, column: u32, row: u32, width: u32, height: u32) -> Panel {
        Panel::new(id, GridCoordinate::new(column, row, width, height))
    }

    fn map(panels: impl IntoIterator<Item = Panel>) -> PanelMap {
        panels.into_iter().map(|p| (p.id.clone(), p)).collect()
    }

    fn rows(panels: &PanelMap) -> Vec<(&str, u32)> {
        panels.values().map(|p| (p.id.as_str(), p.row)).collect()
    }

    #[test]
    fn empty_section_resolves_to_empty() {
        assert!(resolve_section(&PanelMap::new(), None).is_empty());
    }

    #[test]
    fn order_puts_priority_first_on_its_row() {
        let panels = map([
            panel("a", 0, 0, 1, 1),
            panel("b", 4, 0, 1, 1),
            panel("c", 2, 1, 1, 1),
        ]);
        let expected: Vec<PanelId> = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(panel_ids_in_order(&panels, None), expected);
        let expected: Vec<PanelId> = vec!["b".into(), "a".into(), "c".into()];
        assert_eq!(panel_ids_in_order(&panels, Some(&"b".into())), expected);
    }

    #[test]
    fn growing_panel_pushes_neighbour_below() {
        let panels = map([panel("a", 0, 0, 2, 2), panel("b", 0, 2, 2, 1)]);
        let resolved = resolve_section(&panels, Some(&panel("a", 0, 0, 2, 3)));
        assert_eq!(resolved["a"].coordinate(), GridCoordinate::new(0, 0, 2, 3));
        assert_eq!(resolved["b"].row, 3);
    }

    #[test]
    fn request_on_same_row_wins() {
        let panels = map([panel("a", 0, 0, 4, 2), panel("b", 4, 0, 4, 2)]);
        let resolved = resolve_section(&panels, Some(&panel("b", 2, 0, 4, 2)));
        assert_eq!(resolved["b"].coordinate(), GridCoordinate::new(2, 0, 4, 2));
        assert_eq!(resolved["a"].row, 2);
    }

    #[test]
    fn request_below_a_panel_is_pushed_under_it() {
        let panels = map([panel("a", 0, 0, 4, 2), panel("b", 4, 0, 4, 2)]);
        let resolved = resolve_section(&panels, Some(&panel("b", 2, 1, 4, 2)));
        assert_eq!(rows(&resolved), vec![("a", 0), ("b", 2)]);
    }

    #[test]
    fn cascading_pushes_clear_every_collision() {
        let panels = map([
            panel("a", 0, 0, 4, 2),
            panel("b", 0, 2, 4, 2),
            panel("c", 0, 4, 4, 2),
        ]);
        let resolved = resolve_section(&panels, Some(&panel("x", 0, 0, 4, 3)));
        assert_eq!(
            rows(&resolved),
            vec![("a", 3), ("b", 5), ("c", 7), ("x", 0)]
        );
        assert!(find_overlaps(&resolved).is_empty());
    }

    #[test]
    fn panels_pushed_late_are_rechecked_against_earlier_ones() {
        let panels = map([
            panel("a", 3, 0, 1, 4),
            panel("b", 6, 0, 1, 3),
            panel("c", 3, 0, 5, 3),
            panel("d", 6, 2, 2, 2),
        ]);
        let resolved = resolve_section(&panels, None);
        assert!(find_overlaps(&resolved).is_empty());
        assert_eq!(
            rows(&resolved),
            vec![("a", 0), ("b", 0), ("c", 4), ("d", 7)]
        );
        assert_eq!(compact_section(&resolved), resolved);
    }

    #[test]
    fn compaction_closes_gaps() {
        let panels = map([panel("a", 0, 5, 2, 2), panel("b", 0, 9, 2, 1), panel("c", 3, 4, 1, 1)]);
        let compacted = compact_section(&panels);
        assert_eq!(rows(&compacted), vec![("a", 0), ("b", 2), ("c", 0)]);
    }

    #[test]
    fn compaction_reaches_holes_past_narrow_blockers() {
        // e sits below b; a hole in e's columns above b must still be found.
        let panels = map([
            panel("b", 3, 4, 3, 1),
            panel("c", 4, 0, 2, 4),
            panel("e", 0, 5, 4, 1),
        ]);
        let compacted = compact_section(&panels);
        assert_eq!(compacted["e"].row, 0);
        assert_eq!(compacted["b"].row, 4);
    }

    #[test]
    fn resolving_resolved_section_is_identity() {
        let panels = map([
            panel("a", 0, 0, 4, 2),
            panel("b", 4, 0, 2, 5),
            panel("c", 0, 2, 3, 1),
        ]);
        let once = resolve_section(&panels, None);
        assert_eq!(resolve_section(&once, None), once);
    }

    #[test]
    fn payload_survives_resolution() {
        let panels = map([panel("a", 0, 3, 2, 2).with_data(serde_json::json!({"k": 1}))]);
        let resolved = resolve_section(&panels, None);
        assert_eq!(resolved["a"].data, Some(serde_json::json!({"k": 1})));
        assert_eq!(resolved["a"].row, 0);
    }
}
