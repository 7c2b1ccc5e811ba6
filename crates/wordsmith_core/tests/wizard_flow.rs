use pretty_assertions::assert_eq;
use serde_json::json;
use wordsmith_core::wizard::{
    update_wizard, CheckResponse, DataSource, ExistingProject, ProjectInput, SaveMode,
    SavedProject, WizardEffect, WizardMsg, WizardPhase, WizardState,
};
use wordsmith_core::{Notification, SchemaColumn, SchemaColumnType, SubmissionError};

fn step(state: WizardState, msg: WizardMsg) -> (WizardState, Vec<WizardEffect>) {
    update_wizard(state, msg)
}

fn columns() -> Vec<SchemaColumn> {
    vec![
        SchemaColumn::new("id", SchemaColumnType::Unique),
        SchemaColumn::new("review", SchemaColumnType::Textual),
    ]
}

/// Walks a new project through the name check.
fn past_name_check() -> WizardState {
    let (state, _) = step(WizardState::new(None), WizardMsg::ProjectIdEdited("reviews".into()));
    let (state, effects) = step(state, WizardMsg::ContinueClicked);
    assert_eq!(
        effects,
        vec![WizardEffect::CheckProjectId {
            project_id: "reviews".into()
        }]
    );
    let (state, _) = step(
        state,
        WizardMsg::CheckCompleted {
            phase: WizardPhase::CheckProjectId,
            result: Ok(CheckResponse::default()),
        },
    );
    assert_eq!(state.phase(), WizardPhase::CheckDataset);
    state
}

#[test]
fn new_project_walks_all_phases_and_navigates() {
    let state = past_name_check();
    let source = DataSource::csv("data/reviews.csv");
    let (state, _) = step(state, WizardMsg::SourceEdited(source.clone()));
    let (state, effects) = step(state, WizardMsg::ContinueClicked);
    assert_eq!(
        effects,
        vec![WizardEffect::CheckDataset {
            source: source.clone()
        }]
    );
    assert!(state.is_busy());

    let (state, effects) = step(
        state,
        WizardMsg::CheckCompleted {
            phase: WizardPhase::CheckDataset,
            result: Ok(CheckResponse {
                message: Some("Dataset looks good".into()),
                columns: columns(),
            }),
        },
    );
    assert_eq!(
        effects,
        vec![WizardEffect::Notify(Notification::success("Dataset looks good"))]
    );
    assert_eq!(state.phase(), WizardPhase::Configure);
    assert_eq!(state.columns(), columns().as_slice());

    let config = json!({"columns": []});
    let (state, effects) = step(state, WizardMsg::SaveClicked(config.clone()));
    assert_eq!(
        effects,
        vec![WizardEffect::SaveProject {
            mode: SaveMode::Create,
            input: ProjectInput {
                project_id: "reviews".into(),
                source,
                config,
            },
        }]
    );

    let (state, effects) = step(
        state,
        WizardMsg::SaveCompleted(Ok(SavedProject {
            project_id: "reviews".into(),
            message: None,
        })),
    );
    assert_eq!(
        effects,
        vec![WizardEffect::NavigateToProject {
            project_id: "reviews".into()
        }]
    );
    assert_eq!(state.phase(), WizardPhase::Finished);
}

#[test]
fn empty_project_id_is_rejected_locally() {
    let (state, effects) = step(WizardState::new(None), WizardMsg::ContinueClicked);
    assert!(effects.is_empty());
    assert_eq!(state.field_error("projectId"), Some("required"));

    let (state, _) = step(state, WizardMsg::ProjectIdEdited("x".into()));
    assert_eq!(state.field_error("projectId"), None);
}

#[test]
fn remote_check_errors_stay_on_the_phase() {
    let (state, _) = step(WizardState::new(None), WizardMsg::ProjectIdEdited("taken".into()));
    let (state, _) = step(state, WizardMsg::ContinueClicked);

    // A second click while the check runs is ignored.
    let (state, effects) = step(state, WizardMsg::ContinueClicked);
    assert!(effects.is_empty());

    let (state, effects) = step(
        state,
        WizardMsg::CheckCompleted {
            phase: WizardPhase::CheckProjectId,
            result: Err(SubmissionError::new("invalid").with_field("projectId", "already exists")),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), WizardPhase::CheckProjectId);
    assert_eq!(state.field_error("projectId"), Some("already exists"));
    assert!(!state.is_busy());
}

#[test]
fn invalid_dataset_fields_block_the_remote_check() {
    let state = past_name_check();
    let source = DataSource::Excel {
        path: "data/reviews.xlsx".into(),
        sheet_name: " ".into(),
    };
    let (state, _) = step(state, WizardMsg::SourceEdited(source));
    let (state, effects) = step(state, WizardMsg::ContinueClicked);
    assert!(effects.is_empty());
    assert_eq!(state.field_error("source.sheetName"), Some("required"));

    let (state, _) = step(state, WizardMsg::BackClicked);
    assert_eq!(state.phase(), WizardPhase::CheckProjectId);
    assert!(state.field_errors().is_empty());
}

#[test]
fn editing_skips_dataset_check_and_updates() {
    let existing = ExistingProject {
        project_id: "reviews".into(),
        source: DataSource::Parquet {
            path: "data/reviews.parquet".into(),
        },
        columns: columns(),
    };
    let state = WizardState::new(Some(existing));
    assert!(state.is_source_read_only());

    let (state, _) = step(state, WizardMsg::ContinueClicked);
    let (state, _) = step(
        state,
        WizardMsg::CheckCompleted {
            phase: WizardPhase::CheckProjectId,
            result: Ok(CheckResponse::default()),
        },
    );
    let (state, effects) = step(state, WizardMsg::SourceEdited(DataSource::csv("other.csv")));
    assert!(effects.is_empty());
    assert_eq!(state.source().path(), "data/reviews.parquet");

    let (state, effects) = step(state, WizardMsg::ContinueClicked);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), WizardPhase::Configure);

    let (state, effects) = step(state, WizardMsg::SaveClicked(json!({})));
    assert!(matches!(
        effects.as_slice(),
        [WizardEffect::SaveProject {
            mode: SaveMode::Update { .. },
            ..
        }]
    ));
    let (state, effects) = step(
        state,
        WizardMsg::SaveCompleted(Ok(SavedProject {
            project_id: "reviews".into(),
            message: Some("Project updated".into()),
        })),
    );
    assert_eq!(
        effects,
        vec![WizardEffect::Notify(Notification::success("Project updated"))]
    );
    assert_eq!(state.phase(), WizardPhase::Finished);
}

#[test]
fn save_failure_without_fields_notifies() {
    let state = past_name_check();
    let (state, _) = step(state, WizardMsg::SourceEdited(DataSource::csv("a.csv")));
    let (state, _) = step(state, WizardMsg::ContinueClicked);
    let (state, _) = step(
        state,
        WizardMsg::CheckCompleted {
            phase: WizardPhase::CheckDataset,
            result: Ok(CheckResponse::default()),
        },
    );
    let (state, _) = step(state, WizardMsg::SaveClicked(json!({})));
    let (state, effects) = step(
        state,
        WizardMsg::SaveCompleted(Err(SubmissionError::new("disk full"))),
    );
    assert_eq!(
        effects,
        vec![WizardEffect::Notify(Notification::error("disk full"))]
    );
    assert_eq!(state.phase(), WizardPhase::Configure);
    assert_eq!(state.phase().step(), 3);
}

#[test]
fn dataset_rejection_is_keyed_under_source_and_notified() {
    let state = past_name_check();
    let (state, _) = step(state, WizardMsg::SourceEdited(DataSource::csv("missing.csv")));
    let (state, _) = step(state, WizardMsg::ContinueClicked);

    let (state, effects) = step(
        state,
        WizardMsg::CheckCompleted {
            phase: WizardPhase::CheckDataset,
            result: Err(SubmissionError::new("Dataset could not be read")
                .with_field("path", "file not found")),
        },
    );
    assert_eq!(
        effects,
        vec![WizardEffect::Notify(Notification::error(
            "Dataset could not be read"
        ))]
    );
    assert_eq!(state.phase(), WizardPhase::CheckDataset);
    assert_eq!(state.field_error("source.path"), Some("file not found"));
    assert_eq!(state.field_error("path"), None);

    let (state, _) = step(state, WizardMsg::SourceEdited(DataSource::csv("reviews.csv")));
    assert!(state.field_errors().is_empty());
}
