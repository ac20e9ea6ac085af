//! Per-recipient rendering of a template against one table row.

use crate::model::block::{BlockConfig, BlockType};
use crate::model::table::Table;
use crate::model::template::Template;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedBlock {
    pub block_id: String,
    pub block_type: BlockType,
    pub config: BlockConfig,
}

/// A template with every mapped token replaced by one row's values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub template_id: String,
    pub template_name: String,
    pub row_index: usize,
    pub blocks: Vec<RenderedBlock>,
}

impl RenderedDocument {
    /// Plain-text message body, one paragraph per block.
    pub fn to_message(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.config.to_message_lines().join("\n"))
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Renders `template` for data row `row_index`.
///
/// Tokens whose variable has no mapped column, or whose column is not in the
/// table, are left as they are. Cells missing from a short row render as
/// empty text.
pub fn render_document(
    template: &Template,
    mapping: &HashMap<String, String>,
    table: &Table,
    row_index: usize,
) -> RenderedDocument {
    let columns: HashMap<&str, usize> = mapping
        .iter()
        .filter_map(|(variable, column)| {
            table
                .column_index(column)
                .map(|idx| (variable.as_str(), idx))
        })
        .collect();

    let blocks = template
        .ordered_blocks()
        .into_iter()
        .map(|block| RenderedBlock {
            block_id: block.id.clone(),
            block_type: block.block_type(),
            config: block.config().rendered(|id| {
                columns
                    .get(id)
                    .map(|&idx| table.cell(row_index, idx).to_string())
            }),
        })
        .collect();

    RenderedDocument {
        template_id: template.id.clone(),
        template_name: template.name.clone(),
        row_index,
        blocks,
    }
}
