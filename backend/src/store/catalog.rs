use log::info;
use report_common::model::variable::{VariableRegistry, VariableView};
use report_common::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The variable registry offered to every editor.
#[derive(Clone, Default)]
pub struct VariableCatalog {
    registry: Arc<RwLock<VariableRegistry>>,
}

impl VariableCatalog {
    pub async fn suggest(&self, query: &str) -> Vec<VariableView> {
        let registry = self.registry.read().await;
        registry.suggest(query).into_iter().map(VariableView::from).collect()
    }

    pub async fn label_for(&self, id: &str) -> Option<String> {
        self.registry.read().await.label_for(id).map(str::to_string)
    }

    pub async fn register(&self, label: &str, prefix: Option<&str>) -> Result<VariableView> {
        let mut registry = self.registry.write().await;
        let variable = registry.register(label, prefix)?;
        info!("registered variable {}", variable.id);
        Ok(VariableView::from(variable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_common::ReportError;

    #[tokio::test]
    async fn registered_variables_are_suggested() {
        let catalog = VariableCatalog::default();
        let view = catalog.register("Favourite Class", Some("inspiration-zone")).await.unwrap();
        assert_eq!(view.id, "inspiration_zone_favourite_class");
        assert_eq!(view.placeholder, "{{inspiration_zone_favourite_class}}");

        let hits = catalog.suggest("favourite").await;
        assert_eq!(hits.len(), 1);
        assert!(matches!(
            catalog.register("favourite class", Some("inspiration_zone")).await,
            Err(ReportError::DuplicateVariable(_))
        ));
        assert_eq!(catalog.label_for("bmi").await.as_deref(), Some("BMI"));
    }
}
