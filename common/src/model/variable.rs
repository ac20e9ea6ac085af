//! The catalog of known variables and the helpers that format them.
//!
//! A variable is referenced from block text only by the `{{id}}` token
//! convention, so the registry is used for hints and autocomplete, never to
//! reject an unknown token.

use crate::error::{ReportError, Result};
use crate::model::sanitize::sanitize_variable_name;
use serde::{Deserialize, Serialize};

/// Patient fields offered by default in every editor.
const DEFAULT_VARIABLES: &[(&str, &str)] = &[
    ("name", "Name"),
    ("age", "Age"),
    ("current_weight", "Current Weight"),
    ("current_weight_kg", "Current Weight (kg)"),
    ("goal_weight", "Goal Weight"),
    ("goal_weight_kg", "Goal Weight (kg)"),
    ("height_cm", "Height (cm)"),
    ("kg_from_goal", "Kg From Goal"),
    ("bmi", "BMI"),
    ("attendance", "Attendance"),
    ("sessions_completed", "Sessions Completed"),
    ("leaderboard_rank", "Leaderboard Rank"),
    ("journey_reason", "Journey Reason"),
    ("week_number", "Week Number"),
    ("month", "Month"),
];

/// Wraps a variable id in the token syntax used inside block text.
pub fn format_variable(id: &str) -> String {
    format!("{{{{{}}}}}", id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    pub label: String,
}

impl Variable {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// The token form, always derived from `id`.
    pub fn placeholder(&self) -> String {
        format_variable(&self.id)
    }
}

/// Serializable view of a variable that includes its placeholder.
#[derive(Debug, Clone, Serialize)]
pub struct VariableView {
    pub id: String,
    pub label: String,
    pub placeholder: String,
}

impl From<&Variable> for VariableView {
    fn from(variable: &Variable) -> Self {
        Self {
            id: variable.id.clone(),
            label: variable.label.clone(),
            placeholder: variable.placeholder(),
        }
    }
}

/// Ordered set of variables with unique ids.
#[derive(Debug, Clone)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
}

impl Default for VariableRegistry {
    fn default() -> Self {
        Self {
            variables: DEFAULT_VARIABLES
                .iter()
                .map(|(id, label)| Variable::new(*id, *label))
                .collect(),
        }
    }
}

impl VariableRegistry {
    /// Uses the module's own variables when it supplies any, otherwise the
    /// default catalog. Later duplicates of an id are dropped.
    pub fn with_module_variables(module_variables: Vec<Variable>) -> Self {
        if module_variables.is_empty() {
            return Self::default();
        }
        let mut variables: Vec<Variable> = Vec::with_capacity(module_variables.len());
        for variable in module_variables {
            if !variables.iter().any(|v| v.id == variable.id) {
                variables.push(variable);
            }
        }
        Self { variables }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.id == id)
    }

    /// Human label shown next to a token chip. Unknown ids have no hint.
    pub fn label_for(&self, id: &str) -> Option<&str> {
        self.get(id).map(|v| v.label.as_str())
    }

    /// Autocomplete over ids and labels. Prefix matches come first, then
    /// substring matches, each group in registry order. An empty query
    /// returns the whole catalog.
    pub fn suggest(&self, query: &str) -> Vec<&Variable> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.variables.iter().collect();
        }
        let starts = |v: &Variable| {
            v.id.starts_with(&query) || v.label.to_lowercase().starts_with(&query)
        };
        let contains =
            |v: &Variable| v.id.contains(&query) || v.label.to_lowercase().contains(&query);

        let mut result: Vec<&Variable> = self.variables.iter().filter(|v| starts(v)).collect();
        result.extend(self.variables.iter().filter(|v| !starts(v) && contains(v)));
        result
    }

    /// Mints a new variable from a free-text label.
    pub fn register(&mut self, label: &str, prefix: Option<&str>) -> Result<&Variable> {
        let id = sanitize_variable_name(label, prefix);
        if self.get(&id).is_some() {
            return Err(ReportError::DuplicateVariable(id));
        }
        let label = if label.trim().is_empty() {
            id.clone()
        } else {
            label.trim().to_string()
        };
        self.variables.push(Variable::new(id, label));
        let last = self.variables.len() - 1;
        Ok(&self.variables[last])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_derived_from_id() {
        let registry = VariableRegistry::default();
        assert_eq!(registry.len(), 15);
        for variable in registry.iter() {
            assert_eq!(variable.placeholder(), format!("{{{{{}}}}}", variable.id));
        }
        assert_eq!(format_variable("bmi"), "{{bmi}}");
    }

    #[test]
    fn module_variables_replace_defaults() {
        let registry = VariableRegistry::with_module_variables(vec![
            Variable::new("offer", "Offer"),
            Variable::new("offer", "Offer again"),
        ]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.label_for("offer"), Some("Offer"));
        assert!(registry.get("name").is_none());

        let fallback = VariableRegistry::with_module_variables(Vec::new());
        assert!(fallback.get("name").is_some());
    }

    #[test]
    fn suggest_orders_prefix_matches_first() {
        let registry = VariableRegistry::default();
        let ids: Vec<&str> = registry.suggest("weight").iter().map(|v| v.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "current_weight",
                "current_weight_kg",
                "goal_weight",
                "goal_weight_kg"
            ]
        );

        let ids: Vec<&str> = registry.suggest("goal").iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["goal_weight", "goal_weight_kg", "kg_from_goal"]);
    }

    #[test]
    fn register_sanitizes_and_rejects_duplicates() {
        let mut registry = VariableRegistry::default();
        let id = registry
            .register("Promo Code!", Some("package-promotion"))
            .map(|v| v.id.clone())
            .unwrap();
        assert_eq!(id, "package_promotion_promo_code");
        assert_eq!(registry.label_for(&id), Some("Promo Code!"));

        let err = registry.register("BMI", None).unwrap_err();
        assert!(matches!(err, ReportError::DuplicateVariable(id) if id == "bmi"));
    }
}
