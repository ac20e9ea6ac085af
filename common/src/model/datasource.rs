use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How uploaded tables are split into cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableDialect {
    /// Every line is split on `,` with no quoting.
    #[default]
    Naive,
    /// RFC 4180: quoted fields may hold commas, quotes and newlines.
    Rfc4180,
}

impl fmt::Display for TableDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableDialect::Naive => write!(f, "naive"),
            TableDialect::Rfc4180 => write!(f, "rfc4180"),
        }
    }
}

impl FromStr for TableDialect {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "naive" => Ok(TableDialect::Naive),
            "rfc4180" | "csv" => Ok(TableDialect::Rfc4180),
            other => Err(ReportError::Parse(format!("unknown table dialect `{}`", other))),
        }
    }
}

/// Where the current table of a publish session came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub file_name: String,
    pub md5: String,
    pub dialect: TableDialect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dialect_names() {
        assert_eq!("RFC4180".parse::<TableDialect>().unwrap(), TableDialect::Rfc4180);
        assert_eq!(" naive ".parse::<TableDialect>().unwrap(), TableDialect::Naive);
        assert!("tsv".parse::<TableDialect>().is_err());
    }
}
