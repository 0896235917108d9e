//! Normalized layout schema and validation.
//!
//! A [`Layout`] is a map of [`Section`]s keyed by id; each section owns a map
//! of [`Panel`]s keyed by id. The serialized JSON shape is the persistence
//! contract:
//!
//! ```json
//! {
//!   "main-0": { "id": "main-0", "order": 0, "isMainSection": true,
//!               "isCollapsed": false,
//!               "panels": { "a": { "id": "a", "column": 0, "row": 0,
//!                                  "width": 12, "height": 6 } } },
//!   "logs":   { "id": "logs", "order": 1, "isMainSection": false,
//!               "isCollapsed": true, "title": "Logs", "panels": {} }
//! }
//! ```
//!
//! Maps are `BTreeMap`s so iteration, serialization, and equality are
//! deterministic.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resolve::find_overlaps;

/// Stable identifier for a panel, unique across a whole layout.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(String);

/// Stable identifier for a section.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(PanelId);
string_id!(SectionId);

/// A rectangle on the grid, in cells.
///
/// Columns are bounded by the grid's column count; rows grow downward
/// without limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub column: u32,
    pub row: u32,
    pub width: u32,
    pub height: u32,
}

impl GridCoordinate {
    #[must_use]
    pub const fn new(column: u32, row: u32, width: u32, height: u32) -> Self {
        Self {
            column,
            row,
            width,
            height,
        }
    }

    /// Column just past the right edge.
    #[inline]
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.column.saturating_add(self.width)
    }

    /// Row just past the bottom edge.
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.row.saturating_add(self.height)
    }

    /// Whether both the column span and the row span intersect.
    #[inline]
    #[must_use]
    pub const fn overlaps(&self, other: &GridCoordinate) -> bool {
        self.column < other.right()
            && other.column < self.right()
            && self.row < other.bottom()
            && other.row < self.bottom()
    }
}

/// A placed rectangle with an opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: PanelId,
    pub column: u32,
    pub row: u32,
    pub width: u32,
    pub height: u32,
    /// Host payload, carried through every resolver untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Panel {
    #[must_use]
    pub fn new(id: impl Into<PanelId>, coordinate: GridCoordinate) -> Self {
        Self {
            id: id.into(),
            column: coordinate.column,
            row: coordinate.row,
            width: coordinate.width,
            height: coordinate.height,
            data: None,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub const fn coordinate(&self) -> GridCoordinate {
        GridCoordinate::new(self.column, self.row, self.width, self.height)
    }

    /// Copy of this panel moved/resized to `coordinate`.
    #[must_use]
    pub fn with_coordinate(&self, coordinate: GridCoordinate) -> Self {
        Self {
            column: coordinate.column,
            row: coordinate.row,
            width: coordinate.width,
            height: coordinate.height,
            ..self.clone()
        }
    }

    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.row.saturating_add(self.height)
    }

    #[inline]
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.column.saturating_add(self.width)
    }
}

/// Panels of one section, keyed by id.
pub type PanelMap = BTreeMap<PanelId, Panel>;

/// A vertically stacked container of panels.
///
/// Main sections are unlabeled and always expanded; named sections carry a
/// title and may be collapsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub order: usize,
    #[serde(default)]
    pub is_main_section: bool,
    #[serde(default)]
    pub is_collapsed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub panels: PanelMap,
}

impl Section {
    /// An empty main section.
    #[must_use]
    pub fn main(id: impl Into<SectionId>, order: usize) -> Self {
        Self {
            id: id.into(),
            order,
            is_main_section: true,
            is_collapsed: false,
            title: None,
            panels: PanelMap::new(),
        }
    }

    /// An empty, expanded named section.
    #[must_use]
    pub fn named(id: impl Into<SectionId>, title: impl Into<String>, order: usize) -> Self {
        Self {
            id: id.into(),
            order,
            is_main_section: false,
            is_collapsed: false,
            title: Some(title.into()),
            panels: PanelMap::new(),
        }
    }

    /// Builder-style panel insertion.
    #[must_use]
    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panels.insert(panel.id.clone(), panel);
        self
    }

    /// Builder-style collapse; main sections ignore it.
    #[must_use]
    pub fn collapsed(mut self) -> Self {
        self.is_collapsed = !self.is_main_section;
        self
    }

    /// Whether panels of this section are laid out on screen.
    #[inline]
    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.is_main_section || !self.is_collapsed
    }

    /// Number of rows the section occupies: `max(row + height)`.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.panels.values().map(Panel::bottom).max().unwrap_or(0)
    }
}

/// The canonical layout: every section, keyed by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    sections: BTreeMap<SectionId, Section>,
}

impl Layout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a layout from sections, keyed by their own ids.
    #[must_use]
    pub fn from_sections(sections: impl IntoIterator<Item = Section>) -> Self {
        Self {
            sections: sections
                .into_iter()
                .map(|section| (section.id.clone(), section))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    #[must_use]
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.get(id)
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.get_mut(id)
    }

    /// Insert or replace a section under its own id.
    pub fn insert(&mut self, section: Section) -> Option<Section> {
        self.sections.insert(section.id.clone(), section)
    }

    pub fn remove(&mut self, id: &str) -> Option<Section> {
        self.sections.remove(id)
    }

    #[must_use]
    pub fn contains_section(&self, id: &str) -> bool {
        self.sections.contains_key(id)
    }

    /// Sections in key order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn sections_mut(&mut self) -> impl Iterator<Item = &mut Section> {
        self.sections.values_mut()
    }

    /// Sections in display order (`order`, then id).
    #[must_use]
    pub fn sections_in_order(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.sections.values().collect();
        sections.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        sections
    }

    #[must_use]
    pub fn into_sections(self) -> BTreeMap<SectionId, Section> {
        self.sections
    }

    /// Locate a panel and the section that owns it.
    #[must_use]
    pub fn find_panel(&self, id: &str) -> Option<(&SectionId, &Panel)> {
        self.sections
            .values()
            .find_map(|section| section.panels.get(id).map(|panel| (&section.id, panel)))
    }

    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.sections.values().map(|s| s.panels.len()).sum()
    }

    /// Serialize to the JSON persistence shape.
    pub fn to_json_string(&self) -> Result<String, LayoutError> {
        serde_json::to_string(self).map_err(LayoutError::Json)
    }

    /// Parse the JSON persistence shape, rejecting maps whose keys disagree
    /// with the ids they hold.
    pub fn from_json_str(s: &str) -> Result<Self, LayoutError> {
        let layout: Self = serde_json::from_str(s).map_err(LayoutError::Json)?;
        for (key, section) in &layout.sections {
            if key != &section.id {
                return Err(LayoutError::SectionIdMismatch {
                    key: key.clone(),
                    id: section.id.clone(),
                });
            }
            for (panel_key, panel) in &section.panels {
                if panel_key != &panel.id {
                    return Err(LayoutError::PanelIdMismatch {
                        section: key.clone(),
                        key: panel_key.clone(),
                        id: panel.id.clone(),
                    });
                }
            }
        }
        Ok(layout)
    }

    /// Check the structural invariants a resolved layout must hold.
    #[must_use]
    pub fn check_invariants(&self, column_count: u32) -> LayoutReport {
        let mut issues = Vec::new();

        let orders: BTreeSet<usize> = self.sections.values().map(|s| s.order).collect();
        let dense = orders.len() == self.sections.len()
            && orders.iter().copied().eq(0..self.sections.len());
        if !dense {
            issues.push(LayoutIssue {
                code: LayoutIssueCode::OrderNotDense,
                section: None,
                panel: None,
                message: format!("section orders {orders:?} are not 0..{}", self.sections.len()),
            });
        }

        let mut seen: BTreeMap<&PanelId, &SectionId> = BTreeMap::new();
        for section in self.sections.values() {
            if section.is_main_section && section.is_collapsed {
                issues.push(LayoutIssue {
                    code: LayoutIssueCode::CollapsedMainSection,
                    section: Some(section.id.clone()),
                    panel: None,
                    message: "main sections cannot be collapsed".into(),
                });
            }
            for panel in section.panels.values() {
                if let Some(owner) = seen.insert(&panel.id, &section.id) {
                    issues.push(LayoutIssue {
                        code: LayoutIssueCode::DuplicatePanelId,
                        section: Some(section.id.clone()),
                        panel: Some(panel.id.clone()),
                        message: format!("panel also present in section {owner}"),
                    });
                }
                if panel.width == 0 || panel.height == 0 {
                    issues.push(LayoutIssue {
                        code: LayoutIssueCode::ZeroSizedPanel,
                        section: Some(section.id.clone()),
                        panel: Some(panel.id.clone()),
                        message: format!("size {}x{}", panel.width, panel.height),
                    });
                }
                if panel.right() > column_count {
                    issues.push(LayoutIssue {
                        code: LayoutIssueCode::PanelOutOfBounds,
                        section: Some(section.id.clone()),
                        panel: Some(panel.id.clone()),
                        message: format!(
                            "column {} + width {} exceeds {column_count} columns",
                            panel.column, panel.width
                        ),
                    });
                }
            }
            for (a, b) in find_overlaps(&section.panels) {
                issues.push(LayoutIssue {
                    code: LayoutIssueCode::PanelsOverlap,
                    section: Some(section.id.clone()),
                    panel: Some(a),
                    message: format!("overlaps panel {b}"),
                });
            }
        }

        LayoutReport { issues }
    }
}

/// Category of a layout invariant violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutIssueCode {
    OrderNotDense,
    DuplicatePanelId,
    ZeroSizedPanel,
    PanelOutOfBounds,
    CollapsedMainSection,
    PanelsOverlap,
}

/// One invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutIssue {
    pub code: LayoutIssueCode,
    pub section: Option<SectionId>,
    pub panel: Option<PanelId>,
    pub message: String,
}

/// Result of [`Layout::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayoutReport {
    pub issues: Vec<LayoutIssue>,
}

impl LayoutReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn has(&self, code: LayoutIssueCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }
}

/// Failures when reading a serialized layout.
#[derive(Debug)]
pub enum LayoutError {
    Json(serde_json::Error),
    SectionIdMismatch {
        key: SectionId,
        id: SectionId,
    },
    PanelIdMismatch {
        section: SectionId,
        key: PanelId,
        id: PanelId,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "layout JSON error: {e}"),
            Self::SectionIdMismatch { key, id } => {
                write!(f, "section stored under key {key} has id {id}")
            }
            Self::PanelIdMismatch { section, key, id } => write!(
                f,
                "panel stored under key {key} in section {section} has id {id}"
            ),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::SectionIdMismatch { .. } | Self::PanelIdMismatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(id: &str, column: u32, row: u32, width: u32, height: u32) -> Panel {
        Panel::new(id, GridCoordinate::new(column, row, width, height))
    }

    fn sample() -> Layout {
        Layout::from_sections([
            Section::main("main-0", 0)
                .with_panel(panel("a", 0, 0, 12, 6))
                .with_panel(panel("b", 12, 0, 12, 4)),
            Section::named("logs", "Logs", 1).with_panel(panel("c", 0, 0, 48, 8)),
        ])
    }

    #[test]
    fn coordinate_overlap_is_half_open() {
        let a = GridCoordinate::new(0, 0, 2, 2);
        assert!(a.overlaps(&GridCoordinate::new(1, 1, 2, 2)));
        assert!(!a.overlaps(&GridCoordinate::new(2, 0, 2, 2)));
        assert!(!a.overlaps(&GridCoordinate::new(0, 2, 2, 2)));
    }

    #[test]
    fn section_height_is_max_bottom() {
        let layout = sample();
        assert_eq!(layout.section("main-0").map(Section::height), Some(6));
        assert_eq!(Section::main("empty", 0).height(), 0);
    }

    #[test]
    fn find_panel_reports_owner() {
        let layout = sample();
        let (section, found) = layout.find_panel("c").expect("panel c");
        assert_eq!(section.as_str(), "logs");
        assert_eq!(found.coordinate(), GridCoordinate::new(0, 0, 48, 8));
        assert!(layout.find_panel("missing").is_none());
        assert_eq!(layout.panel_count(), 3);
    }

    #[test]
    fn sections_in_order_follow_order_field() {
        let mut layout = sample();
        layout.section_mut("logs").expect("logs").order = 0;
        layout.section_mut("main-0").expect("main").order = 1;
        let ids: Vec<&str> = layout
            .sections_in_order()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["logs", "main-0"]);
    }

    #[test]
    fn json_shape_matches_contract() {
        let layout = sample();
        let value: serde_json::Value =
            serde_json::from_str(&layout.to_json_string().expect("serialize")).expect("json");
        assert_eq!(value["logs"]["isMainSection"], false);
        assert_eq!(value["logs"]["isCollapsed"], false);
        assert_eq!(value["logs"]["title"], "Logs");
        assert_eq!(value["main-0"]["order"], 0);
        assert_eq!(value["main-0"]["panels"]["b"]["column"], 12);
        assert!(value["main-0"].get("title").is_none());
        assert!(value["main-0"]["panels"]["a"].get("data").is_none());
    }

    #[test]
    fn json_round_trip_keeps_payload() {
        let mut layout = sample();
        let section = layout.section_mut("logs").expect("logs");
        let c = section.panels.get_mut("c").expect("c");
        c.data = Some(serde_json::json!({ "kind": "lens", "query": "*" }));
        let text = layout.to_json_string().expect("serialize");
        assert_eq!(Layout::from_json_str(&text).expect("parse"), layout);
    }

    #[test]
    fn json_rejects_mismatched_keys() {
        let text = r#"{"a": {"id": "b", "order": 0, "isMainSection": true, "panels": {}}}"#;
        assert!(matches!(
            Layout::from_json_str(text),
            Err(LayoutError::SectionIdMismatch { .. })
        ));
        let text = r#"{"a": {"id": "a", "order": 0, "panels":
            {"p": {"id": "q", "column": 0, "row": 0, "width": 1, "height": 1}}}}"#;
        assert!(matches!(
            Layout::from_json_str(text),
            Err(LayoutError::PanelIdMismatch { .. })
        ));
    }

    #[test]
    fn invariants_hold_for_sample() {
        assert!(sample().check_invariants(48).is_valid());
    }

    #[test]
    fn invariants_catch_violations() {
        let mut layout = sample();
        layout.section_mut("logs").expect("logs").order = 5;
        let main = layout.section_mut("main-0").expect("main");
        main.is_collapsed = true;
        main.panels.insert("c".into(), panel("c", 40, 0, 10, 1));
        main.panels.insert("z".into(), panel("z", 2, 2, 0, 1));
        let report = layout.check_invariants(48);
        assert!(report.has(LayoutIssueCode::OrderNotDense));
        assert!(report.has(LayoutIssueCode::CollapsedMainSection));
        assert!(report.has(LayoutIssueCode::DuplicatePanelId));
        assert!(report.has(LayoutIssueCode::PanelOutOfBounds));
        assert!(report.has(LayoutIssueCode::ZeroSizedPanel));
        assert!(report.has(LayoutIssueCode::PanelsOverlap));
    }
}
