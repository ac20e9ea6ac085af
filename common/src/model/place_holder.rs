use serde::{Deserialize, Serialize};

/// Kind of value a table column appears to hold, guessed from its first row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceholderType {
    Text,
    Number,
    Currency,
    Email,
}

impl PlaceholderType {
    const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

    pub fn infer(value: &str) -> Self {
        let value = value.trim();
        if value.contains('@') && value.contains('.') {
            PlaceholderType::Email
        } else if value.chars().any(|ch| Self::CURRENCY_SYMBOLS.contains(&ch)) {
            PlaceholderType::Currency
        } else if !value.is_empty() && value.parse::<f64>().is_ok() {
            PlaceholderType::Number
        } else {
            PlaceholderType::Text
        }
    }
}
