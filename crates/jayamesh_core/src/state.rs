//! Navigation and modal state for interactive front-ends.
//!
//! # Invariants
//! - State only changes through [`AppState::apply`].
//! - A selected section always belongs to the selected project: selecting a
//!   project clears the section selection.
//! - After `Loaded`, the selected project exists in the loaded list, or no
//!   project is selected because the list is empty.

use crate::model::project::ProjectId;
use crate::model::section::SectionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Sections,
    Goals,
    Tasks,
    Notes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    QuickCapture,
    Project,
    Section,
    Goal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub selected_project: Option<ProjectId>,
    pub selected_section: Option<SectionId>,
    pub view: ViewMode,
    pub quick_capture_open: bool,
    pub project_modal_open: bool,
    pub section_modal_open: bool,
    pub goal_modal_open: bool,
    pub sidebar_collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    SelectProject(Option<ProjectId>),
    SelectSection(Option<SectionId>),
    SetView(ViewMode),
    OpenModal(Modal),
    CloseModal(Modal),
    /// Closes every modal.
    Escape,
    ToggleSidebar,
    /// Project ids currently in storage, in display order.
    Loaded(Vec<ProjectId>),
}

impl AppState {
    pub fn apply(&mut self, action: AppAction) {
        match action {
            AppAction::SelectProject(id) => {
                if self.selected_project != id {
                    self.selected_section = None;
                }
                self.selected_project = id;
            }
            AppAction::SelectSection(id) => self.selected_section = id,
            AppAction::SetView(view) => self.view = view,
            AppAction::OpenModal(modal) => *self.modal_flag(modal) = true,
            AppAction::CloseModal(modal) => *self.modal_flag(modal) = false,
            AppAction::Escape => {
                self.quick_capture_open = false;
                self.project_modal_open = false;
                self.section_modal_open = false;
                self.goal_modal_open = false;
            }
            AppAction::ToggleSidebar => self.sidebar_collapsed = !self.sidebar_collapsed,
            AppAction::Loaded(ids) => {
                let still_present = self
                    .selected_project
                    .is_some_and(|selected| ids.contains(&selected));
                if !still_present {
                    self.selected_project = ids.first().copied();
                    self.selected_section = None;
                }
            }
        }
    }

    pub fn is_open(&self, modal: Modal) -> bool {
        match modal {
            Modal::QuickCapture => self.quick_capture_open,
            Modal::Project => self.project_modal_open,
            Modal::Section => self.section_modal_open,
            Modal::Goal => self.goal_modal_open,
        }
    }

    fn modal_flag(&mut self, modal: Modal) -> &mut bool {
        match modal {
            Modal::QuickCapture => &mut self.quick_capture_open,
            Modal::Project => &mut self.project_modal_open,
            Modal::Section => &mut self.section_modal_open,
            Modal::Goal => &mut self.goal_modal_open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppAction, AppState, Modal, ViewMode};
    use uuid::Uuid;

    #[test]
    fn escape_closes_every_modal() {
        let mut state = AppState::default();
        state.apply(AppAction::OpenModal(Modal::QuickCapture));
        state.apply(AppAction::OpenModal(Modal::Goal));
        assert!(state.is_open(Modal::Goal));

        state.apply(AppAction::Escape);
        assert!(!state.is_open(Modal::QuickCapture));
        assert!(!state.is_open(Modal::Goal));
    }

    #[test]
    fn switching_project_clears_section() {
        let mut state = AppState::default();
        let first = Uuid::new_v4();
        state.apply(AppAction::SelectProject(Some(first)));
        state.apply(AppAction::SelectSection(Some(Uuid::new_v4())));

        state.apply(AppAction::SelectProject(Some(first)));
        assert!(state.selected_section.is_some());

        state.apply(AppAction::SelectProject(Some(Uuid::new_v4())));
        assert_eq!(state.selected_section, None);
    }

    #[test]
    fn loaded_selects_first_and_drops_stale_selection() {
        let mut state = AppState::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        state.apply(AppAction::Loaded(vec![a, b]));
        assert_eq!(state.selected_project, Some(a));

        state.apply(AppAction::SelectProject(Some(b)));
        state.apply(AppAction::Loaded(vec![a, b]));
        assert_eq!(state.selected_project, Some(b));

        state.apply(AppAction::Loaded(vec![a]));
        assert_eq!(state.selected_project, Some(a));

        state.apply(AppAction::Loaded(Vec::new()));
        assert_eq!(state.selected_project, None);
    }

    #[test]
    fn view_and_sidebar_toggle() {
        let mut state = AppState::default();
        assert_eq!(state.view, ViewMode::Sections);
        state.apply(AppAction::SetView(ViewMode::Notes));
        state.apply(AppAction::ToggleSidebar);
        assert_eq!(state.view, ViewMode::Notes);
        assert!(state.sidebar_collapsed);
    }
}
