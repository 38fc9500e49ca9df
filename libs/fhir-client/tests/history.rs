use ferrum_fhir_client::client::latest_version;
use ferrum_models::Bundle;
use ferrum_questionnaire::{from_fhir, to_fhir};
use serde_json::Value;
use std::{fs::File, path::PathBuf};

fn load_fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name);
    let file = File::open(&path).expect("failed to open fixture");
    serde_json::from_reader(file).expect("failed to deserialize fixture")
}

#[test]
fn newest_history_entry_is_lifted() {
    let bundle = Bundle::from_value(&load_fixture("history.json")).unwrap();
    assert_eq!(bundle.link_url("prev"), Some("https://fhir.example.org/Questionnaire/intake/_history?page=0"));

    let latest = latest_version(&bundle).unwrap();
    assert_eq!(latest["title"], "Intake v12");

    let doc = from_fhir(latest).unwrap();
    assert_eq!(doc.tree.len(), 1);
    assert_eq!(&to_fhir(&doc), latest);
}
