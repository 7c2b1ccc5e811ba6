use serde::{Deserialize, Serialize};

/// Column type as inferred/configured on the server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaColumnType {
    Unique,
    Categorical,
    Continuous,
    Temporal,
    Textual,
    Geospatial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: SchemaColumnType,
}

impl SchemaColumn {
    pub fn new(name: impl Into<String>, column_type: SchemaColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

pub fn first_textual_column(columns: &[SchemaColumn]) -> Option<&SchemaColumn> {
    columns
        .iter()
        .find(|col| col.column_type == SchemaColumnType::Textual)
}

pub fn textual_columns(columns: &[SchemaColumn]) -> impl Iterator<Item = &SchemaColumn> {
    columns
        .iter()
        .filter(|col| col.column_type == SchemaColumnType::Textual)
}

/// Columns that may be associated with a textual column. Unique columns
/// (ids) carry no signal.
pub fn non_unique_columns(columns: &[SchemaColumn]) -> impl Iterator<Item = &SchemaColumn> {
    columns
        .iter()
        .filter(|col| col.column_type != SchemaColumnType::Unique)
}
