//! Editor state for one template, updated only through [`EditorState::apply`].
//!
//! The state keeps a linear snapshot history for undo/redo and the MD5 of the
//! last saved template so callers can show an unsaved-changes marker.

use crate::error::{ReportError, Result};
use crate::model::block::BlockType;
use crate::model::template::{LayoutType, Template};
use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Every change the builder can make to a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditorAction {
    AddBlock { block_type: BlockType },
    RemoveBlock { block_id: String },
    DuplicateBlock { block_id: String },
    UpdateConfig { block_id: String, patch: Map<String, Value> },
    Reorder { block_ids: Vec<String> },
    PromoteSelection {
        block_id: String,
        field: String,
        #[serde(default)]
        index: Option<usize>,
        start: usize,
        end: usize,
        #[serde(default)]
        name: Option<String>,
    },
    SelectBlock { block_id: Option<String> },
    Rename { name: String },
    SetDescription { description: String },
    SetTags { tags: Vec<String> },
    SetLayout { layout_type: Option<LayoutType> },
    Undo,
    Redo,
    MarkSaved,
}

/// What the API returns after every editor action.
#[derive(Debug, Clone, Serialize)]
pub struct EditorView {
    pub template: Template,
    pub selected_block_id: Option<String>,
    pub dirty: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Snapshots kept for undo, the current one included.
pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct EditorState {
    pub template: Template,
    pub selected_block_id: Option<String>,
    history: Vec<Template>,
    history_index: usize,
    saved_md5: String,
}

/// MD5 of the template's JSON form.
pub fn compute_md5(template: &Template) -> String {
    let json = serde_json::to_string(template).unwrap_or_default();
    format!("{:x}", md5::compute(json))
}

impl EditorState {
    /// Starts editing `template`, treating it as saved.
    pub fn new(template: Template) -> Self {
        let saved_md5 = compute_md5(&template);
        Self {
            history: vec![template.clone()],
            history_index: 0,
            template,
            selected_block_id: None,
            saved_md5,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history_index + 1 < self.history.len()
    }

    /// True when the template differs from what was last saved.
    pub fn is_dirty(&self) -> bool {
        compute_md5(&self.template) != self.saved_md5
    }

    pub fn view(&self) -> EditorView {
        EditorView {
            template: self.template.clone(),
            selected_block_id: self.selected_block_id.clone(),
            dirty: self.is_dirty(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    fn with_template(&self, template: Template, selected: Option<String>) -> EditorState {
        let mut next = self.clone();
        next.history.truncate(self.history_index + 1);
        next.history.push(template.clone());
        if next.history.len() > HISTORY_LIMIT {
            let excess = next.history.len() - HISTORY_LIMIT;
            next.history.drain(..excess);
        }
        next.history_index = next.history.len() - 1;
        next.template = template;
        next.selected_block_id = selected;
        next
    }

    fn keep_selection_if_present(&self, template: &Template) -> Option<String> {
        self.selected_block_id
            .clone()
            .filter(|id| template.block(id).is_some())
    }

    fn moved_to(&self, index: usize) -> EditorState {
        let mut next = self.clone();
        next.history_index = index;
        next.template = self.history[index].clone();
        next.selected_block_id = self.keep_selection_if_present(&next.template);
        next
    }

    /// Returns the state after `action`. On error `self` is still valid and
    /// unchanged.
    pub fn apply(&self, action: EditorAction) -> Result<EditorState> {
        debug!("editor {}: {:?}", self.template.id, action);
        let next = match action {
            EditorAction::AddBlock { block_type } => {
                let (template, id) = self.template.add_block(block_type);
                self.with_template(template, Some(id))
            }
            EditorAction::RemoveBlock { block_id } => {
                let template = self.template.remove_block(&block_id)?;
                let selected = self.keep_selection_if_present(&template);
                self.with_template(template, selected)
            }
            EditorAction::DuplicateBlock { block_id } => {
                let (template, id) = self.template.duplicate_block(&block_id)?;
                self.with_template(template, Some(id))
            }
            EditorAction::UpdateConfig { block_id, patch } => {
                let template = self.template.update_block_config(&block_id, &patch)?;
                self.with_template(template, self.selected_block_id.clone())
            }
            EditorAction::Reorder { block_ids } => {
                let template = self.template.reorder_blocks(&block_ids)?;
                self.with_template(template, self.selected_block_id.clone())
            }
            EditorAction::PromoteSelection {
                block_id,
                field,
                index,
                start,
                end,
                name,
            } => {
                let (template, _) = self.template.promote_selection(
                    &block_id,
                    &field,
                    index,
                    start,
                    end,
                    name.as_deref(),
                )?;
                self.with_template(template, self.selected_block_id.clone())
            }
            EditorAction::SelectBlock { block_id } => {
                if let Some(id) = &block_id {
                    if self.template.block(id).is_none() {
                        return Err(ReportError::BlockNotFound(id.clone()));
                    }
                }
                let mut next = self.clone();
                next.selected_block_id = block_id;
                next
            }
            EditorAction::Rename { name } => {
                let template = self.template.renamed(&name)?;
                self.with_template(template, self.selected_block_id.clone())
            }
            EditorAction::SetDescription { description } => {
                let template = self.template.with_description(&description);
                self.with_template(template, self.selected_block_id.clone())
            }
            EditorAction::SetTags { tags } => {
                let template = self.template.with_tags(tags);
                self.with_template(template, self.selected_block_id.clone())
            }
            EditorAction::SetLayout { layout_type } => {
                let template = self.template.with_layout(layout_type);
                self.with_template(template, self.selected_block_id.clone())
            }
            EditorAction::Undo => {
                if !self.can_undo() {
                    return Ok(self.clone());
                }
                self.moved_to(self.history_index - 1)
            }
            EditorAction::Redo => {
                if !self.can_redo() {
                    return Ok(self.clone());
                }
                self.moved_to(self.history_index + 1)
            }
            EditorAction::MarkSaved => {
                let mut next = self.clone();
                next.template = self.template.touched(Utc::now());
                next.history[next.history_index] = next.template.clone();
                next.saved_md5 = compute_md5(&next.template);
                next
            }
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn editor() -> EditorState {
        EditorState::new(Template::new("Draft").unwrap())
    }

    fn heading_patch(text: &str) -> Map<String, Value> {
        let mut patch = Map::new();
        patch.insert("heading".into(), json!(text));
        patch
    }

    #[test]
    fn add_selects_new_block_and_marks_dirty() {
        let state = editor();
        assert!(!state.is_dirty());
        let next = state
            .apply(EditorAction::AddBlock {
                block_type: BlockType::CustomText,
            })
            .unwrap();
        assert_eq!(next.template.blocks.len(), 1);
        assert_eq!(next.selected_block_id.as_deref(), Some(next.template.blocks[0].id.as_str()));
        assert!(next.is_dirty());
        assert!(state.template.blocks.is_empty());
    }

    #[test]
    fn removing_selected_block_clears_selection() {
        let state = editor()
            .apply(EditorAction::AddBlock {
                block_type: BlockType::Divider,
            })
            .unwrap();
        let id = state.selected_block_id.clone().unwrap();
        let next = state.apply(EditorAction::RemoveBlock { block_id: id }).unwrap();
        assert!(next.selected_block_id.is_none());
    }

    #[test]
    fn undo_redo_walks_history() {
        let state = editor()
            .apply(EditorAction::AddBlock {
                block_type: BlockType::CustomText,
            })
            .unwrap();
        let id = state.template.blocks[0].id.clone();
        let edited = state
            .apply(EditorAction::UpdateConfig {
                block_id: id.clone(),
                patch: heading_patch("Hi {{name}}"),
            })
            .unwrap();

        let undone = edited.apply(EditorAction::Undo).unwrap();
        assert_eq!(undone.template, state.template);
        assert!(undone.can_redo());

        let redone = undone.apply(EditorAction::Redo).unwrap();
        assert_eq!(redone.template, edited.template);

        let branched = undone
            .apply(EditorAction::Rename {
                name: "Other".into(),
            })
            .unwrap();
        assert!(!branched.can_redo());
    }

    #[test]
    fn history_keeps_only_the_latest_snapshots() {
        let mut state = editor();
        for i in 0..HISTORY_LIMIT + 20 {
            state = state
                .apply(EditorAction::Rename {
                    name: format!("Draft {}", i),
                })
                .unwrap();
        }
        assert_eq!(state.history.len(), HISTORY_LIMIT);
        assert_eq!(state.history_index, HISTORY_LIMIT - 1);

        while state.can_undo() {
            state = state.apply(EditorAction::Undo).unwrap();
        }
        assert_eq!(state.template.name, "Draft 20");
        let state = state.apply(EditorAction::Redo).unwrap();
        assert_eq!(state.template.name, "Draft 21");
    }

    #[test]
    fn undo_at_start_is_a_no_op() {
        let state = editor();
        let same = state.apply(EditorAction::Undo).unwrap();
        assert_eq!(same.template, state.template);
        assert!(!same.can_undo());
    }

    #[test]
    fn mark_saved_clears_dirty_flag() {
        let state = editor()
            .apply(EditorAction::SetTags {
                tags: vec!["cohort-a".into()],
            })
            .unwrap();
        assert!(state.is_dirty());
        let saved = state.apply(EditorAction::MarkSaved).unwrap();
        assert!(!saved.is_dirty());
        assert!(saved.template.last_edited_at >= state.template.last_edited_at);
    }

    #[test]
    fn failed_action_reports_error() {
        let state = editor();
        let err = state
            .apply(EditorAction::SelectBlock {
                block_id: Some("nope".into()),
            })
            .unwrap_err();
        assert!(matches!(err, ReportError::BlockNotFound(_)));
    }

    #[test]
    fn actions_deserialize_from_tagged_json() {
        let action: EditorAction = serde_json::from_value(json!({
            "action": "add_block",
            "block_type": "basic-info"
        }))
        .unwrap();
        assert!(matches!(
            action,
            EditorAction::AddBlock {
                block_type: BlockType::BasicInfo
            }
        ));
    }
}
