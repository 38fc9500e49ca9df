use ferrum_fhir_client::FileDocument;
use ferrum_models::QuestionnaireItemType;
use ferrum_questionnaire::{ItemNode, Position};
use ferrum_session::{
    AutosaveOptions, AutosaveOutcome, EditSession, FileStore, LoadOutcome, StateStore,
    QUESTIONNAIRE_KEY,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn quick() -> AutosaveOptions {
    AutosaveOptions {
        debounce: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn edits_survive_a_restart() {
    let state_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(state_dir.path()));

    let mut session = EditSession::new(store.clone(), quick()).await.unwrap();
    let outcome = session
        .load_from(&FileDocument::new(fixture("intake.json")), false)
        .await
        .unwrap();
    assert_eq!(outcome, LoadOutcome::Replaced);

    let smoker = session.model().tree.find_by_link_id("smoker").unwrap();
    session.model_mut().tree.rename(smoker, "tobacco").unwrap();
    session
        .model_mut()
        .tree
        .insert(
            Position::Root(2),
            ItemNode::new("notes", QuestionnaireItemType::Text, "Notes"),
        )
        .unwrap();
    session.set_step("items");

    let saved = session.schedule_autosave().await.unwrap().unwrap();
    assert_eq!(saved, AutosaveOutcome::Saved);

    let mut resumed = EditSession::new(Arc::new(FileStore::new(state_dir.path())), quick())
        .await
        .unwrap();
    assert!(resumed.restore().await.unwrap());
    let lowered = resumed.lower();
    assert_eq!(lowered["item"][1]["enableWhen"][0]["question"], json!("tobacco"));
    assert_eq!(lowered["item"][2]["linkId"], json!("notes"));
    assert_eq!(resumed.step(), Some("items"));
    assert_eq!(lowered, session.lower());
}

#[tokio::test]
async fn second_import_needs_confirmation() {
    let state_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(state_dir.path()));
    let mut session = EditSession::new(store.clone(), AutosaveOptions::default())
        .await
        .unwrap();
    let source = FileDocument::new(fixture("intake.json"));

    session.load_from(&source, false).await.unwrap();
    let pending = session.schedule_autosave();
    assert_eq!(
        session.load_from(&source, false).await.unwrap(),
        LoadOutcome::NeedsConfirmation
    );
    assert_eq!(
        session.load_from(&source, true).await.unwrap(),
        LoadOutcome::Replaced
    );

    assert_eq!(pending.await.unwrap().unwrap(), AutosaveOutcome::Superseded);
    assert_eq!(store.load(QUESTIONNAIRE_KEY).await.unwrap(), None);
}
