use crate::model::place_holder::PlaceholderType;
use serde::{Deserialize, Serialize};

/// What the operator sees for one uploaded column while mapping and
/// previewing: its header, the inferred kind of value and the first data row's
/// value as an example.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ColumnCheck {
    pub title: String,
    pub placeholder_type: PlaceholderType,
    pub first_row: Option<String>,
}
