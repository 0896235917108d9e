//! Whole-layout edits requested by the host.
//!
//! Every function takes the current layout and returns a new, resolved one;
//! nothing is mutated in place. Section-level edits finish with
//! [`resolve_sections`], panel-level edits resolve the affected section.

use std::fmt;

use crate::model::{Layout, Panel, PanelId, Section, SectionId};
use crate::resolve::{compact_section, resolve_section};
use crate::sections::{next_main_section_id, resolve_sections};

/// What happens to the panels of a removed section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveSectionPolicy {
    /// Panels are deleted with the section.
    DeletePanels,
    /// Panels move into a main section at the removed section's position,
    /// merging with a main section directly above or below.
    MovePanelsToMain,
}

/// Rejected edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    UnknownSection(SectionId),
    UnknownPanel(PanelId),
    DuplicatePanel(PanelId),
    DuplicateSection(SectionId),
    NotANamedSection(SectionId),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSection(id) => write!(f, "unknown section {id}"),
            Self::UnknownPanel(id) => write!(f, "unknown panel {id}"),
            Self::DuplicatePanel(id) => write!(f, "panel {id} already exists"),
            Self::DuplicateSection(id) => write!(f, "section {id} already exists"),
            Self::NotANamedSection(id) => {
                write!(f, "section {id} is a main section and has no title or collapse state")
            }
        }
    }
}

impl std::error::Error for EditError {}

/// Insert `panel` into `section` at its coordinate and resolve the section.
///
/// The coordinate is clamped to the grid first: width to
/// `1..=column_count`, column so the panel ends inside the grid, height to
/// at least 1.
pub fn add_panel(
    layout: &Layout,
    section: &str,
    panel: Panel,
    column_count: u32,
) -> Result<Layout, EditError> {
    if layout.find_panel(panel.id.as_str()).is_some() {
        return Err(EditError::DuplicatePanel(panel.id));
    }
    let mut next = layout.clone();
    let target = next
        .section_mut(section)
        .ok_or_else(|| EditError::UnknownSection(section.into()))?;

    let mut placed = panel;
    placed.width = placed.width.clamp(1, column_count.max(1));
    placed.column = placed.column.min(column_count.saturating_sub(placed.width));
    placed.height = placed.height.max(1);

    target.panels = resolve_section(&target.panels, Some(&placed));
    Ok(next)
}

/// Insert a new panel below everything else in `section`.
pub fn add_panel_at_bottom(
    layout: &Layout,
    section: &str,
    id: impl Into<PanelId>,
    width: u32,
    height: u32,
    column_count: u32,
) -> Result<Layout, EditError> {
    let row = layout
        .section(section)
        .ok_or_else(|| EditError::UnknownSection(section.into()))?
        .height();
    let panel = Panel {
        id: id.into(),
        column: 0,
        row,
        width,
        height,
        data: None,
    };
    add_panel(layout, section, panel, column_count)
}

/// Remove a panel and compact the section it leaves.
pub fn remove_panel(layout: &Layout, id: &str) -> Result<Layout, EditError> {
    let owner = layout
        .find_panel(id)
        .map(|(section, _)| section.clone())
        .ok_or_else(|| EditError::UnknownPanel(id.into()))?;
    let mut next = layout.clone();
    if let Some(section) = next.section_mut(owner.as_str()) {
        section.panels.remove(id);
        section.panels = compact_section(&section.panels);
    }
    Ok(next)
}

/// Append an empty, expanded named section at the bottom.
pub fn add_section(
    layout: &Layout,
    id: impl Into<SectionId>,
    title: impl Into<String>,
) -> Result<Layout, EditError> {
    let id = id.into();
    if layout.contains_section(id.as_str()) {
        return Err(EditError::DuplicateSection(id));
    }
    let mut next = layout.clone();
    next.insert(Section::named(id, title, layout.len()));
    Ok(resolve_sections(&next))
}

/// Remove a named section.
pub fn remove_section(
    layout: &Layout,
    id: &str,
    policy: RemoveSectionPolicy,
) -> Result<Layout, EditError> {
    let section = named_section(layout, id)?;
    let mut next = layout.clone();
    next.remove(id);

    if policy == RemoveSectionPolicy::MovePanelsToMain && !section.panels.is_empty() {
        let mut main = Section::main(next_main_section_id(&next), section.order);
        main.panels = section.panels.clone();
        next.insert(main);
    }
    Ok(resolve_sections(&next))
}

/// Collapse or expand a named section.
pub fn set_section_collapsed(
    layout: &Layout,
    id: &str,
    collapsed: bool,
) -> Result<Layout, EditError> {
    named_section(layout, id)?;
    let mut next = layout.clone();
    if let Some(section) = next.section_mut(id) {
        section.is_collapsed = collapsed;
    }
    Ok(next)
}

/// Change the title of a named section.
pub fn rename_section(
    layout: &Layout,
    id: &str,
    title: impl Into<String>,
) -> Result<Layout, EditError> {
    named_section(layout, id)?;
    let mut next = layout.clone();
    if let Some(section) = next.section_mut(id) {
        section.title = Some(title.into());
    }
    Ok(next)
}

/// Drop empty main sections and renumber orders.
///
/// Panel gestures never prune; hosts call this when they want empty main
/// sections gone without a full [`resolve_sections`] pass.
#[must_use]
pub fn prune_empty_main_sections(layout: &Layout) -> Layout {
    let kept: Vec<Section> = layout
        .sections_in_order()
        .into_iter()
        .filter(|section| !(section.is_main_section && section.panels.is_empty()))
        .cloned()
        .enumerate()
        .map(|(order, section)| Section { order, ..section })
        .collect();
    Layout::from_sections(kept)
}

fn named_section<'a>(layout: &'a Layout, id: &str) -> Result<&'a Section, EditError> {
    let section = layout
        .section(id)
        .ok_or_else(|| EditError::UnknownSection(id.into()))?;
    if section.is_main_section {
        return Err(EditError::NotANamedSection(section.id.clone()));
    }
    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GridCoordinate;
    use crate::sections::section_ids_in_order;

    fn panel(id: &str, column: u32, row: u32, width: u32, height: u32) -> Panel {
        Panel::new(id, GridCoordinate::new(column, row, width, height))
    }

    fn base() -> Layout {
        Layout::from_sections([
            Section::main("main-0", 0).with_panel(panel("a", 0, 0, 4, 2)),
            Section::named("s", "S", 1).with_panel(panel("b", 0, 0, 4, 2)),
            Section::main("main-1", 2).with_panel(panel("c", 0, 0, 4, 1)),
        ])
    }

    #[test]
    fn add_panel_clamps_and_resolves() {
        let next = add_panel(&base(), "main-0", panel("n", 46, 0, 6, 1), 48).expect("added");
        let main = next.section("main-0").expect("main");
        assert_eq!(main.panels["n"].coordinate(), GridCoordinate::new(42, 0, 6, 1));
        assert!(next.check_invariants(48).is_valid());

        let next = add_panel(&base(), "main-0", panel("n", 0, 0, 4, 1), 48).expect("added");
        let main = next.section("main-0").expect("main");
        assert_eq!(main.panels["n"].row, 0);
        assert_eq!(main.panels["a"].row, 1);
    }

    #[test]
    fn add_panel_rejects_duplicates_and_unknown_sections() {
        assert_eq!(
            add_panel(&base(), "main-0", panel("b", 0, 0, 1, 1), 48),
            Err(EditError::DuplicatePanel("b".into()))
        );
        assert_eq!(
            add_panel(&base(), "nope", panel("z", 0, 0, 1, 1), 48),
            Err(EditError::UnknownSection("nope".into()))
        );
    }

    #[test]
    fn add_panel_at_bottom_stacks_below() {
        let next = add_panel_at_bottom(&base(), "main-0", "n", 10, 3, 48).expect("added");
        let main = next.section("main-0").expect("main");
        assert_eq!(main.panels["n"].coordinate(), GridCoordinate::new(0, 2, 10, 3));
    }

    #[test]
    fn remove_panel_compacts_owner() {
        let layout = Layout::from_sections([Section::main("main-0", 0)
            .with_panel(panel("a", 0, 0, 4, 2))
            .with_panel(panel("b", 0, 2, 4, 1))]);
        let next = remove_panel(&layout, "a").expect("removed");
        let main = next.section("main-0").expect("main");
        assert!(!main.panels.contains_key("a"));
        assert_eq!(main.panels["b"].row, 0);
        assert_eq!(
            remove_panel(&layout, "zzz"),
            Err(EditError::UnknownPanel("zzz".into()))
        );
    }

    #[test]
    fn add_section_appends() {
        let next = add_section(&base(), "t", "T").expect("added");
        let t = next.section("t").expect("t");
        assert_eq!(t.order, 3);
        assert!(!t.is_collapsed);
        assert_eq!(
            add_section(&base(), "s", "again"),
            Err(EditError::DuplicateSection("s".into()))
        );
    }

    #[test]
    fn remove_section_deleting_panels_merges_neighbours() {
        let next = remove_section(&base(), "s", RemoveSectionPolicy::DeletePanels).expect("ok");
        assert_eq!(section_ids_in_order(&next), vec![SectionId::from("main-0")]);
        assert!(next.find_panel("b").is_none());
        let main = next.section("main-0").expect("main");
        assert_eq!(main.panels["c"].row, 2);
    }

    #[test]
    fn remove_section_moving_panels_keeps_them() {
        let next =
            remove_section(&base(), "s", RemoveSectionPolicy::MovePanelsToMain).expect("ok");
        assert_eq!(next.len(), 1);
        let main = next.section("main-0").expect("main");
        assert_eq!(main.panels["a"].row, 0);
        assert_eq!(main.panels["b"].row, 2);
        assert_eq!(main.panels["c"].row, 4);
        assert!(next.check_invariants(48).is_valid());
    }

    #[test]
    fn main_sections_have_no_collapse_or_title() {
        assert_eq!(
            set_section_collapsed(&base(), "main-0", true),
            Err(EditError::NotANamedSection("main-0".into()))
        );
        assert_eq!(
            remove_section(&base(), "main-0", RemoveSectionPolicy::DeletePanels),
            Err(EditError::NotANamedSection("main-0".into()))
        );
        let next = set_section_collapsed(&base(), "s", true).expect("collapsed");
        assert!(next.section("s").expect("s").is_collapsed);
        let next = rename_section(&next, "s", "Renamed").expect("renamed");
        assert_eq!(next.section("s").and_then(|s| s.title.clone()), Some("Renamed".into()));
    }

    #[test]
    fn pruning_keeps_named_sections() {
        let layout = Layout::from_sections([
            Section::main("main-0", 0),
            Section::named("s", "S", 1),
            Section::main("main-1", 2).with_panel(panel("c", 0, 0, 1, 1)),
        ]);
        let next = prune_empty_main_sections(&layout);
        assert_eq!(
            section_ids_in_order(&next),
            vec![SectionId::from("s"), SectionId::from("main-1")]
        );
        assert_eq!(next.section("main-1").map(|s| s.order), Some(1));
    }
}
