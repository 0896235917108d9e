//! The per-grid reactive state container.
//!
//! [`GridLayoutState`] owns the canonical layout, the staged layout of a
//! panel gesture, and the records of whichever gesture is active. Views
//! read it through observables; gestures go through its action methods
//! (`start_drag`, `move_panel`, `start_section_drag`, ...).
//!
//! Panel gestures stage their result in `proposed_layout` and promote it on
//! commit. Section gestures write the canonical layout live and keep a
//! snapshot for cancel. `visible_layout` always holds what should be drawn:
//! the staged layout while one exists, otherwise the canonical one.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use panelgrid_core::RuntimeSettings;
use panelgrid_layout::{
    EditError, GridCoordinate, Layout, Panel, Section, SectionId, is_grid_data_equal,
    is_section_equal,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::interaction::{
    ActivePanel, InteractionPhase, PanelInteraction, PanelInteractionKind, SectionDragEvent,
};
use crate::measure::ElementMeasurer;
use crate::reactive::{Derived, Observable};

/// Where one panel is, as seen by its view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    pub section: SectionId,
    pub panel: Panel,
}

/// Last placement handed to the resolver during a panel gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PanelRequest {
    pub(crate) section: SectionId,
    pub(crate) coordinate: GridCoordinate,
}

/// Rejected calls on [`GridLayoutState`].
#[derive(Debug)]
pub enum StateError {
    /// Layout edits wait until the active gesture ends.
    GestureActive(InteractionPhase),
    Edit(EditError),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GestureActive(phase) => {
                write!(f, "layout edit rejected while {phase:?} is in progress")
            }
            Self::Edit(e) => write!(f, "layout edit failed: {e}"),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Edit(e) => Some(e),
            Self::GestureActive(_) => None,
        }
    }
}

/// Reactive state of one grid instance.
pub struct GridLayoutState {
    pub(crate) layout: Observable<Layout>,
    pub(crate) proposed_layout: Observable<Option<Layout>>,
    pub(crate) visible_layout: Observable<Layout>,
    pub(crate) interaction: Observable<Option<PanelInteraction>>,
    pub(crate) active_panel: Observable<Option<ActivePanel>>,
    pub(crate) active_section: Observable<Option<SectionDragEvent>>,
    pub(crate) settings: Observable<RuntimeSettings>,
    pub(crate) measurer: Rc<dyn ElementMeasurer>,
    /// Canonical layout before the active section drag.
    pub(crate) section_snapshot: RefCell<Option<Layout>>,
    pub(crate) last_request: RefCell<Option<PanelRequest>>,
}

impl fmt::Debug for GridLayoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridLayoutState")
            .field("phase", &self.phase())
            .field("layout_version", &self.layout.version())
            .field("settings", &self.settings.get())
            .finish_non_exhaustive()
    }
}

impl GridLayoutState {
    #[must_use]
    pub fn new(
        layout: Layout,
        settings: RuntimeSettings,
        measurer: Rc<dyn ElementMeasurer>,
    ) -> Self {
        Self {
            visible_layout: Observable::new(layout.clone()),
            layout: Observable::new(layout),
            proposed_layout: Observable::new(None),
            interaction: Observable::new(None),
            active_panel: Observable::new(None),
            active_section: Observable::new(None),
            settings: Observable::new(settings),
            measurer,
            section_snapshot: RefCell::new(None),
            last_request: RefCell::new(None),
        }
    }

    /// Canonical layout.
    #[must_use]
    pub fn layout(&self) -> &Observable<Layout> {
        &self.layout
    }

    /// Staged layout of the active panel gesture.
    #[must_use]
    pub fn proposed_layout(&self) -> &Observable<Option<Layout>> {
        &self.proposed_layout
    }

    /// The layout views should draw.
    #[must_use]
    pub fn visible_layout(&self) -> &Observable<Layout> {
        &self.visible_layout
    }

    #[must_use]
    pub fn interaction(&self) -> &Observable<Option<PanelInteraction>> {
        &self.interaction
    }

    #[must_use]
    pub fn active_panel(&self) -> &Observable<Option<ActivePanel>> {
        &self.active_panel
    }

    #[must_use]
    pub fn active_section(&self) -> &Observable<Option<SectionDragEvent>> {
        &self.active_section
    }

    #[must_use]
    pub fn settings(&self) -> &Observable<RuntimeSettings> {
        &self.settings
    }

    /// Replace the grid metrics, e.g. after the grid element was resized.
    pub fn set_settings(&self, settings: RuntimeSettings) -> bool {
        self.settings.set(settings)
    }

    #[must_use]
    pub fn phase(&self) -> InteractionPhase {
        if self.active_section.with(Option::is_some) {
            return InteractionPhase::DraggingSection;
        }
        self.interaction.with(|interaction| match interaction {
            None => InteractionPhase::Idle,
            Some(i) if i.kind == PanelInteractionKind::Drag => InteractionPhase::Dragging,
            Some(_) => InteractionPhase::Resizing,
        })
    }

    /// Replace the canonical layout as a whole.
    ///
    /// Returns whether anything changed. An active panel gesture keeps its
    /// staged layout.
    pub fn replace_layout(&self, layout: Layout) -> bool {
        let changed = self.layout.set(layout);
        if changed {
            debug!(version = self.layout.version(), "layout replaced");
            self.sync_visible();
        }
        changed
    }

    /// Apply a layout edit such as [`panelgrid_layout::add_panel`].
    ///
    /// Edits are rejected while a gesture is active.
    pub fn apply_edit(
        &self,
        edit: impl FnOnce(&Layout) -> Result<Layout, EditError>,
    ) -> Result<bool, StateError> {
        let phase = self.phase();
        if phase != InteractionPhase::Idle {
            return Err(StateError::GestureActive(phase));
        }
        let next = self.layout.with(edit).map_err(StateError::Edit)?;
        Ok(self.replace_layout(next))
    }

    /// Position of one panel in the visible layout.
    ///
    /// Fires only when the panel changes section or coordinates.
    #[must_use]
    pub fn panel_state(&self, id: &str) -> Derived<Option<PanelState>> {
        let id = id.to_owned();
        Derived::new(
            &self.visible_layout,
            move |layout: &Layout| {
                layout.find_panel(&id).map(|(section, panel)| PanelState {
                    section: section.clone(),
                    panel: panel.clone(),
                })
            },
            |a: &Option<PanelState>, b: &Option<PanelState>| match (a, b) {
                (Some(a), Some(b)) => {
                    a.section == b.section && is_grid_data_equal(&a.panel, &b.panel)
                }
                (None, None) => true,
                _ => false,
            },
        )
    }

    /// One section of the visible layout.
    ///
    /// Fires only when the section's flags, order, title, or panel geometry
    /// change.
    #[must_use]
    pub fn section_state(&self, id: &str) -> Derived<Option<Section>> {
        let id = id.to_owned();
        Derived::new(
            &self.visible_layout,
            move |layout: &Layout| layout.section(&id).cloned(),
            |a: &Option<Section>, b: &Option<Section>| match (a, b) {
                (Some(a), Some(b)) => is_section_equal(a, b),
                (None, None) => true,
                _ => false,
            },
        )
    }

    pub(crate) fn sync_visible(&self) {
        let next = self
            .proposed_layout
            .get()
            .unwrap_or_else(|| self.layout.get());
        self.visible_layout.set(next);
    }
}
