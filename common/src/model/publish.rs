//! Binding a template's variables to an uploaded table.
//!
//! A [`PublishSession`] walks `Upload -> Mapping -> Preview -> Success`. It
//! snapshots the template when it starts, so edits made afterwards do not leak
//! into an attempt that is already mapping columns. The session only ever
//! hands over a mapping that covers every variable the template uses.

use crate::error::{ReportError, Result};
use crate::model::csv::ColumnCheck;
use crate::model::datasource::DataSource;
use crate::model::render::{render_document, RenderedDocument};
use crate::model::table::Table;
use crate::model::template::Template;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Distinct variable ids referenced by `template`, in order of first use.
///
/// Blocks are visited in render order and each block's text fields in
/// declaration order.
pub fn extract_variables(template: &Template) -> Vec<String> {
    let mut variables: Vec<String> = Vec::new();
    for block in template.ordered_blocks() {
        for id in block.config().variable_ids() {
            if !variables.contains(&id) {
                variables.push(id);
            }
        }
    }
    variables
}

/// Proposes a column for each variable.
///
/// A header equal to the variable id (ignoring case) wins. Otherwise the first
/// header containing the id is used. Variables with neither stay unmapped.
pub fn auto_map(variables: &[String], headers: &[String]) -> HashMap<String, String> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let mut mapping = HashMap::new();
    for variable in variables {
        let needle = variable.to_lowercase();
        let found = lowered
            .iter()
            .position(|h| *h == needle)
            .or_else(|| lowered.iter().position(|h| h.contains(&needle)));
        if let Some(idx) = found {
            debug!("auto-mapped {} -> {}", variable, headers[idx]);
            mapping.insert(variable.clone(), headers[idx].clone());
        }
    }
    mapping
}

/// Variables without a non-empty column, in `variables` order.
pub fn unmapped(variables: &[String], mapping: &HashMap<String, String>) -> Vec<String> {
    variables
        .iter()
        .filter(|v| mapping.get(*v).is_none_or(|column| column.is_empty()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStep {
    Upload,
    Mapping,
    Preview,
    Success,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishStep::Upload => "upload",
            PublishStep::Mapping => "mapping",
            PublishStep::Preview => "preview",
            PublishStep::Success => "success",
        };
        write!(f, "{}", name)
    }
}

/// What delivery receives once a session commits.
#[derive(Debug, Clone)]
pub struct PublishHandoff {
    pub session_id: String,
    pub template: Template,
    pub mapping: HashMap<String, String>,
    pub table: Table,
}

impl PublishHandoff {
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn render_row(&self, row: usize) -> RenderedDocument {
        render_document(&self.template, &self.mapping, &self.table, row)
    }
}

/// Serializable snapshot of a session for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub template_id: String,
    pub template_name: String,
    pub step: PublishStep,
    pub variables: Vec<String>,
    pub mapping: HashMap<String, String>,
    pub unmapped: Vec<String>,
    pub headers: Vec<String>,
    pub columns: Vec<ColumnCheck>,
    pub source: Option<DataSource>,
    pub row_count: usize,
    pub preview: Option<RenderedDocument>,
}

#[derive(Debug, Clone)]
pub struct PublishSession {
    id: String,
    template: Template,
    variables: Vec<String>,
    step: PublishStep,
    table: Option<Table>,
    source: Option<DataSource>,
    mapping: HashMap<String, String>,
}

impl PublishSession {
    pub fn new(template: Template) -> Self {
        let variables = extract_variables(&template);
        Self {
            id: Uuid::new_v4().to_string(),
            template,
            variables,
            step: PublishStep::Upload,
            table: None,
            source: None,
            mapping: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn step(&self) -> PublishStep {
        self.step
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn source(&self) -> Option<&DataSource> {
        self.source.as_ref()
    }

    pub fn mapping(&self) -> &HashMap<String, String> {
        &self.mapping
    }

    pub fn unmapped(&self) -> Vec<String> {
        unmapped(&self.variables, &self.mapping)
    }

    fn refuse(&self, action: &str) -> ReportError {
        warn!("publish {}: cannot {} in step {}", self.id, action, self.step);
        ReportError::InvalidTransition {
            action: action.to_string(),
            step: self.step.to_string(),
        }
    }

    fn require(&self, step: PublishStep, action: &str) -> Result<()> {
        if self.step != step {
            return Err(self.refuse(action));
        }
        Ok(())
    }

    /// Replaces the uploaded table and re-runs auto-mapping against its
    /// headers. Any earlier table and mapping are discarded.
    pub fn ingest(&mut self, table: Table, source: DataSource) -> Result<()> {
        self.require(PublishStep::Upload, "upload")?;
        if self.source.as_ref().is_some_and(|s| s.md5 == source.md5) {
            info!("publish {}: {} is identical to the previous upload", self.id, source.file_name);
        }
        self.mapping = auto_map(&self.variables, table.headers());
        info!(
            "publish {}: ingested {} ({} rows, {} of {} variables auto-mapped)",
            self.id,
            source.file_name,
            table.row_count(),
            self.mapping.len(),
            self.variables.len()
        );
        self.table = Some(table);
        self.source = Some(source);
        Ok(())
    }

    /// Moves one step forward. Leaving `Upload` needs a table; `Preview` moves
    /// on only through [`PublishSession::commit`].
    pub fn advance(&mut self) -> Result<PublishStep> {
        self.step = match self.step {
            PublishStep::Upload if self.table.is_some() => PublishStep::Mapping,
            PublishStep::Upload => return Err(ReportError::MissingField("file".to_string())),
            PublishStep::Mapping => PublishStep::Preview,
            PublishStep::Preview | PublishStep::Success => return Err(self.refuse("advance")),
        };
        Ok(self.step)
    }

    /// Returns to the previous step from `Mapping` or `Preview`.
    pub fn back(&mut self) -> Result<PublishStep> {
        self.step = match self.step {
            PublishStep::Mapping => PublishStep::Upload,
            PublishStep::Preview => PublishStep::Mapping,
            PublishStep::Upload | PublishStep::Success => return Err(self.refuse("go back")),
        };
        Ok(self.step)
    }

    /// Points `variable` at `column`, or clears it when `column` is empty.
    pub fn set_mapping(&mut self, variable: &str, column: &str) -> Result<()> {
        self.require(PublishStep::Mapping, "change the mapping")?;
        if !self.variables.iter().any(|v| v == variable) {
            return Err(ReportError::UnknownVariable(variable.to_string()));
        }
        if column.is_empty() {
            self.mapping.remove(variable);
            return Ok(());
        }
        let known = self
            .table
            .as_ref()
            .is_some_and(|t| t.column_index(column).is_some());
        if !known {
            return Err(ReportError::UnknownColumn(column.to_string()));
        }
        self.mapping.insert(variable.to_string(), column.to_string());
        Ok(())
    }

    /// Fails with every still-unmapped variable, in extraction order.
    pub fn validate(&self) -> Result<()> {
        let missing = self.unmapped();
        if !missing.is_empty() {
            warn!("publish {}: unmapped variables {:?}", self.id, missing);
            return Err(ReportError::UnmappedVariables(missing));
        }
        Ok(())
    }

    /// The first data row rendered with the current mapping.
    pub fn preview(&self) -> Option<RenderedDocument> {
        let table = self.table.as_ref()?;
        if table.row_count() == 0 {
            return None;
        }
        Some(render_document(&self.template, &self.mapping, table, 0))
    }

    /// Completes the attempt. Only allowed from `Preview` with a total
    /// mapping; the session is then terminal.
    pub fn commit(&mut self) -> Result<PublishHandoff> {
        self.require(PublishStep::Preview, "publish")?;
        self.validate()?;
        let table = self
            .table
            .clone()
            .ok_or_else(|| ReportError::MissingField("file".to_string()))?;
        self.step = PublishStep::Success;
        info!(
            "publish {}: committed template {} for {} recipients",
            self.id,
            self.template.id,
            table.row_count()
        );
        Ok(PublishHandoff {
            session_id: self.id.clone(),
            template: self.template.clone(),
            mapping: self.mapping.clone(),
            table,
        })
    }

    pub fn view(&self) -> SessionView {
        let preview = match self.step {
            PublishStep::Preview | PublishStep::Success => self.preview(),
            PublishStep::Upload | PublishStep::Mapping => None,
        };
        SessionView {
            id: self.id.clone(),
            template_id: self.template.id.clone(),
            template_name: self.template.name.clone(),
            step: self.step,
            variables: self.variables.clone(),
            mapping: self.mapping.clone(),
            unmapped: self.unmapped(),
            headers: self
                .table
                .as_ref()
                .map(|t| t.headers().to_vec())
                .unwrap_or_default(),
            columns: self.table.as_ref().map(Table::columns).unwrap_or_default(),
            source: self.source.clone(),
            row_count: self.table.as_ref().map_or(0, Table::row_count),
            preview,
        }
    }
}
