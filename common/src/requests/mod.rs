//! JSON bodies accepted by the HTTP API.

use crate::model::block::BlockType;
use crate::model::template::LayoutType;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub layout_type: Option<LayoutType>,
}

/// Metadata edit. Absent fields are left as they are.
#[derive(Deserialize)]
pub struct UpdateMetaRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    /// `Some(None)` clears the layout.
    #[serde(default, with = "double_option")]
    pub layout_type: Option<Option<LayoutType>>,
}

#[derive(Deserialize)]
pub struct AddBlockRequest {
    pub block_type: BlockType,
}

/// Shallow config patch for one block.
#[derive(Deserialize)]
pub struct PatchConfigRequest {
    pub patch: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct ReorderBlocksRequest {
    pub block_ids: Vec<String>,
}

/// Byte range of a text field to turn into a variable token.
#[derive(Deserialize)]
pub struct PromoteSelectionRequest {
    pub field: String,
    /// Item of a list field, e.g. one of `bullets`.
    #[serde(default)]
    pub index: Option<usize>,
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct SanitizeRequest {
    pub raw: String,
    pub prefix: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterVariableRequest {
    pub label: String,
    pub prefix: Option<String>,
}

#[derive(Deserialize)]
pub struct VariableQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct StartPublishRequest {
    pub template_id: String,
}

/// Manual override of one variable's column. An empty column clears it.
#[derive(Deserialize)]
pub struct MappingRequest {
    pub variable: String,
    #[serde(default)]
    pub column: String,
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
