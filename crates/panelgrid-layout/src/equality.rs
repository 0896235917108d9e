//! Structural equality used to gate state writes.
//!
//! These comparisons look at geometry and structure only: panel payloads are
//! ignored, so a host updating a payload does not trigger re-resolution.

use crate::model::{Layout, Panel, Section};

/// Same id and same grid coordinate.
#[must_use]
pub fn is_grid_data_equal(a: &Panel, b: &Panel) -> bool {
    a.id == b.id && a.coordinate() == b.coordinate()
}

/// Same id, order, flags, title, and panel geometry.
#[must_use]
pub fn is_section_equal(a: &Section, b: &Section) -> bool {
    a.id == b.id
        && a.order == b.order
        && a.is_main_section == b.is_main_section
        && a.is_collapsed == b.is_collapsed
        && a.title == b.title
        && a.panels.len() == b.panels.len()
        && a.panels.iter().zip(b.panels.iter()).all(|((ka, pa), (kb, pb))| {
            ka == kb && is_grid_data_equal(pa, pb)
        })
}

/// Whether two layouts have the same sections and panel geometry.
#[must_use]
pub fn is_layout_equal(a: &Layout, b: &Layout) -> bool {
    a.len() == b.len()
        && a
            .sections()
            .zip(b.sections())
            .all(|(sa, sb)| is_section_equal(sa, sb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GridCoordinate;

    fn layout(row: u32) -> Layout {
        Layout::from_sections([Section::main("main-0", 0)
            .with_panel(Panel::new("a", GridCoordinate::new(0, row, 2, 2)))])
    }

    #[test]
    fn payload_is_ignored() {
        let a = Panel::new("a", GridCoordinate::new(0, 0, 1, 1));
        let b = a.clone().with_data(serde_json::json!("x"));
        assert!(is_grid_data_equal(&a, &b));
        assert_ne!(a, b);
    }

    #[test]
    fn geometry_differences_are_detected() {
        assert!(is_layout_equal(&layout(0), &layout(0)));
        assert!(!is_layout_equal(&layout(0), &layout(1)));
    }

    #[test]
    fn section_flags_are_compared() {
        let a = Section::named("s", "S", 0);
        let mut b = a.clone();
        b.is_collapsed = true;
        assert!(!is_section_equal(&a, &b));
        let mut c = a.clone();
        c.order = 1;
        assert!(!is_section_equal(&a, &c));
    }

    #[test]
    fn membership_differences_are_detected() {
        let a = layout(0);
        let mut b = a.clone();
        b.insert(Section::named("extra", "Extra", 1));
        assert!(!is_layout_equal(&a, &b));
    }
}
