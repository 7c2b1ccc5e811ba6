use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{first_textual_column, SchemaColumn};

/// Which server-side procedure a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureKind {
    TopicModeling,
    TopicEvaluation,
    VariableAssociation,
}

impl ProcedureKind {
    /// Path segment used both for cache keys and remote endpoints.
    pub fn segment(self) -> &'static str {
        match self {
            ProcedureKind::TopicModeling => "topics",
            ProcedureKind::TopicEvaluation => "evaluation",
            ProcedureKind::VariableAssociation => "association",
        }
    }
}

/// Identifies one unit of server-side work. Doubles as the cache/dedup key.
///
/// Column selections are optional because the inputs they come from may be
/// empty; such requests are simply not actionable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcedureRequest {
    TopicModeling {
        project_id: String,
    },
    TopicEvaluation {
        project_id: String,
        column: Option<String>,
    },
    VariableAssociation {
        project_id: String,
        column1: Option<String>,
        column2: Option<String>,
    },
}

impl ProcedureRequest {
    pub fn topic_modeling(project_id: impl Into<String>) -> Self {
        ProcedureRequest::TopicModeling {
            project_id: project_id.into(),
        }
    }

    pub fn topic_evaluation(project_id: impl Into<String>, column: Option<&str>) -> Self {
        ProcedureRequest::TopicEvaluation {
            project_id: project_id.into(),
            column: column.map(ToOwned::to_owned),
        }
    }

    pub fn variable_association(
        project_id: impl Into<String>,
        column1: Option<&str>,
        column2: Option<&str>,
    ) -> Self {
        ProcedureRequest::VariableAssociation {
            project_id: project_id.into(),
            column1: column1.map(ToOwned::to_owned),
            column2: column2.map(ToOwned::to_owned),
        }
    }

    /// Evaluation request preselecting the first textual column of the dataset.
    pub fn topic_evaluation_for(project_id: impl Into<String>, columns: &[SchemaColumn]) -> Self {
        Self::topic_evaluation(project_id, first_textual_column(columns).map(|c| c.name.as_str()))
    }

    /// Association request preselecting the first textual column on the left;
    /// the right-hand column is left for the user to choose.
    pub fn variable_association_for(
        project_id: impl Into<String>,
        columns: &[SchemaColumn],
    ) -> Self {
        Self::variable_association(
            project_id,
            first_textual_column(columns).map(|c| c.name.as_str()),
            None,
        )
    }

    pub fn kind(&self) -> ProcedureKind {
        match self {
            ProcedureRequest::TopicModeling { .. } => ProcedureKind::TopicModeling,
            ProcedureRequest::TopicEvaluation { .. } => ProcedureKind::TopicEvaluation,
            ProcedureRequest::VariableAssociation { .. } => ProcedureKind::VariableAssociation,
        }
    }

    pub fn project_id(&self) -> &str {
        match self {
            ProcedureRequest::TopicModeling { project_id }
            | ProcedureRequest::TopicEvaluation { project_id, .. }
            | ProcedureRequest::VariableAssociation { project_id, .. } => project_id,
        }
    }

    /// True when every field the remote needs is present and non-blank.
    pub fn is_actionable(&self) -> bool {
        if self.project_id().trim().is_empty() {
            return false;
        }
        match self {
            ProcedureRequest::TopicModeling { .. } => true,
            ProcedureRequest::TopicEvaluation { column, .. } => is_present(column),
            ProcedureRequest::VariableAssociation {
                column1, column2, ..
            } => is_present(column1) && is_present(column2),
        }
    }

    /// Named parameters sent to the remote, in a stable order.
    /// Missing columns are omitted.
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        match self {
            ProcedureRequest::TopicModeling { .. } => Vec::new(),
            ProcedureRequest::TopicEvaluation { column, .. } => {
                column.as_deref().map(|c| ("column", c)).into_iter().collect()
            }
            ProcedureRequest::VariableAssociation {
                column1, column2, ..
            } => [("column1", column1), ("column2", column2)]
                .into_iter()
                .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
                .collect(),
        }
    }

    /// Stable textual key, e.g. `evaluation/p1/text`. Every column slot of
    /// the kind gets a segment; a missing column leaves it empty.
    pub fn cache_key(&self) -> String {
        let columns: Vec<Option<&str>> = match self {
            ProcedureRequest::TopicModeling { .. } => Vec::new(),
            ProcedureRequest::TopicEvaluation { column, .. } => vec![column.as_deref()],
            ProcedureRequest::VariableAssociation {
                column1, column2, ..
            } => vec![column1.as_deref(), column2.as_deref()],
        };
        let mut key = format!("{}/{}", self.kind().segment(), self.project_id());
        for column in columns {
            key.push('/');
            key.push_str(column.unwrap_or_default());
        }
        key
    }
}

/// No project selected yet; never actionable.
impl Default for ProcedureRequest {
    fn default() -> Self {
        ProcedureRequest::topic_modeling("")
    }
}

impl fmt::Display for ProcedureRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}
