use log::info;
use report_common::model::editor::{EditorAction, EditorState};
use report_common::model::template::{LayoutType, Template};
use report_common::{ReportError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Templates being edited, keyed by template id. Each entry carries its own
/// undo history and saved fingerprint.
#[derive(Clone, Default)]
pub struct TemplateStore {
    editors: Arc<RwLock<HashMap<String, EditorState>>>,
}

fn not_found(template_id: &str) -> ReportError {
    ReportError::TemplateNotFound(template_id.to_string())
}

impl TemplateStore {
    pub async fn create(
        &self,
        name: &str,
        description: &str,
        tags: Vec<String>,
        layout_type: Option<LayoutType>,
    ) -> Result<EditorState> {
        let template = Template::new(name)?
            .with_description(description)
            .with_tags(tags)
            .with_layout(layout_type);
        let state = EditorState::new(template);
        info!("created template {} ({})", state.template.name, state.template.id);
        self.editors
            .write()
            .await
            .insert(state.template.id.clone(), state.clone());
        Ok(state)
    }

    pub async fn get(&self, template_id: &str) -> Result<EditorState> {
        self.editors
            .read()
            .await
            .get(template_id)
            .cloned()
            .ok_or_else(|| not_found(template_id))
    }

    /// Current templates, most recently edited first.
    pub async fn list(&self) -> Vec<Template> {
        let editors = self.editors.read().await;
        let mut templates: Vec<Template> = editors.values().map(|s| s.template.clone()).collect();
        templates.sort_by(|a, b| b.last_edited_at.cmp(&a.last_edited_at));
        templates
    }

    pub async fn apply(&self, template_id: &str, action: EditorAction) -> Result<EditorState> {
        self.apply_all(template_id, vec![action]).await
    }

    /// Runs editor actions in order. The stored state only changes when all
    /// of them succeed.
    pub async fn apply_all(
        &self,
        template_id: &str,
        actions: Vec<EditorAction>,
    ) -> Result<EditorState> {
        let mut editors = self.editors.write().await;
        let mut next = editors
            .get(template_id)
            .cloned()
            .ok_or_else(|| not_found(template_id))?;
        for action in actions {
            next = next.apply(action)?;
        }
        editors.insert(template_id.to_string(), next.clone());
        Ok(next)
    }

    /// Stamps `lastEditedAt` and records the current content as saved.
    pub async fn save(&self, template_id: &str) -> Result<EditorState> {
        let state = self.apply(template_id, EditorAction::MarkSaved).await?;
        info!("saved template {}", template_id);
        Ok(state)
    }

    pub async fn delete(&self, template_id: &str) -> Result<()> {
        self.editors
            .write()
            .await
            .remove(template_id)
            .map(|state| info!("deleted template {}", state.template.id))
            .ok_or_else(|| not_found(template_id))
    }

    pub async fn duplicate(&self, template_id: &str) -> Result<EditorState> {
        let mut editors = self.editors.write().await;
        let source = editors.get(template_id).ok_or_else(|| not_found(template_id))?;
        let state = EditorState::new(source.template.duplicate());
        info!("duplicated template {} as {}", template_id, state.template.id);
        editors.insert(state.template.id.clone(), state.clone());
        Ok(state)
    }
}
