use ferrum_questionnaire::codecs::{ExtractionContext, LaunchContext, LinkPeriod, UseContextValue};
use ferrum_questionnaire::prune::{is_empty, prune_empty};
use ferrum_questionnaire::{
    from_fhir, parse_questionnaire, to_fhir, EditorDocument, LformsConverter, QuestionRef,
};
use serde_json::{json, Value};
use std::{fs::File, path::PathBuf};

fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
}

fn load_fixture(name: &str) -> Value {
    let path = test_data_dir().join(name);
    assert!(path.exists(), "fixture missing at {:?}", path);

    let file = File::open(&path).expect("failed to open fixture");
    serde_json::from_reader(file).expect("failed to deserialize fixture")
}

fn lift(raw: &Value) -> EditorDocument {
    from_fhir(raw).expect("fixture should lift")
}

const FIXTURES: [&str; 3] = ["end-to-end.json", "sdc-full.json", "messy.json"];

#[test]
fn end_to_end_import_scenario() {
    let raw = load_fixture("end-to-end.json");
    let doc = lift(&raw);
    let tree = &doc.tree;

    let weight = tree.find_by_link_id("weight").unwrap();
    let node = tree.get(weight).unwrap();
    assert_eq!(node.help_text(), Some("Measured without shoes"));
    assert!(tree.children(weight).is_empty());
    assert_eq!(
        node.state.observation_link_period,
        Some(LinkPeriod {
            value: 200.into(),
            unit: "days".to_string()
        })
    );
    assert!(!node.is_hidden());

    let internal = tree.find_by_link_id("internal").unwrap();
    let hidden_subtree = tree.subtree(internal);
    assert_eq!(hidden_subtree.len(), 4);
    for id in hidden_subtree {
        assert!(tree.get(id).unwrap().is_hidden(), "{} should be hidden", id);
    }
    let visible = tree.find_by_link_id("visible").unwrap();
    assert!(!tree.get(visible).unwrap().is_hidden());

    assert_eq!(to_fhir(&doc), raw);
}

#[test]
fn unedited_documents_lower_to_their_input() {
    for name in ["end-to-end.json", "sdc-full.json"] {
        let raw = load_fixture(name);
        assert_eq!(to_fhir(&lift(&raw)), raw, "{} changed on round trip", name);
    }
}

#[test]
fn messy_document_loses_only_empty_members() {
    let raw = load_fixture("messy.json");
    let lowered = to_fhir(&lift(&raw));

    let mut expected = raw.clone();
    prune_empty(&mut expected);
    assert_eq!(lowered, expected);
    assert_eq!(
        lowered,
        json!({
            "resourceType": "Questionnaire",
            "status": "draft",
            "item": [
                {"linkId": "a", "text": "A", "type": "string", "required": false, "maxLength": 0},
                {"linkId": "b", "type": "display"}
            ]
        })
    );
}

#[test]
fn round_trip_is_stable() {
    for name in FIXTURES {
        let once = to_fhir(&lift(&load_fixture(name)));
        let twice = to_fhir(&lift(&once));
        assert_eq!(once, twice, "{} is not stable", name);
    }
}

#[test]
fn pruning_is_idempotent_over_fixtures() {
    for name in FIXTURES {
        let mut once = load_fixture(name);
        prune_empty(&mut once);
        let mut twice = once.clone();
        prune_empty(&mut twice);
        assert_eq!(once, twice);
        assert!(!is_empty(&once));
    }
}

#[test]
fn sdc_extensions_are_decoded() {
    let doc = lift(&load_fixture("sdc-full.json"));

    assert_eq!(
        doc.state.launch_context,
        vec![LaunchContext {
            name: "patient".to_string(),
            type_: "Patient".to_string(),
            description: "The patient filling the form".to_string(),
        }]
    );
    assert_eq!(doc.state.variables.len(), 1);
    assert_eq!(doc.state.variables[0].name.as_deref(), Some("age"));
    assert_eq!(doc.state.terminology_server, "https://tx.fhir.org/r4");
    assert_eq!(
        doc.state.use_context,
        Some(UseContextValue {
            code: "cardio".to_string(),
            display: "Cardiology".to_string(),
            system: "http://example.org/domains".to_string(),
        })
    );

    let tree = &doc.tree;
    let smoker = tree.get(tree.find_by_link_id("smoker").unwrap()).unwrap();
    assert!(smoker.state.observation_extract);
    assert_eq!(smoker.state.initial_expressions.len(), 1);

    let packs = tree.get(tree.find_by_link_id("packs").unwrap()).unwrap();
    assert_eq!(packs.state.calculated_expressions[0].description.as_deref(), Some("from history"));
    assert_eq!(packs.state.sources[0].comment, "from the legacy EHR");

    let history = tree.get(tree.find_by_link_id("history").unwrap()).unwrap();
    assert_eq!(
        history.state.extraction_context,
        ExtractionContext::Code("Condition".to_string())
    );

    let condition_id = tree.find_by_link_id("condition").unwrap();
    let condition = tree.get(condition_id).unwrap();
    assert_eq!(condition.state.answer_expressions.len(), 1);
    assert_eq!(condition.state.terminology_server, "https://tx.example.org/fhir");
    assert_eq!(
        condition.enable_when[1].question,
        Some(QuestionRef::Node(tree.find_by_link_id("smoker").unwrap()))
    );
}

#[test]
fn edited_document_state_is_lowered() {
    let mut doc = lift(&load_fixture("sdc-full.json"));
    doc.state.use_context = None;
    doc.state.terminology_server.clear();
    doc.state.launch_context.push(LaunchContext {
        name: "encounter".to_string(),
        type_: "Encounter".to_string(),
        description: String::new(),
    });

    let lowered = to_fhir(&doc);
    assert!(lowered.get("useContext").is_none());

    let urls: Vec<&str> = lowered["extension"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["url"].as_str())
        .collect();
    assert_eq!(
        urls,
        vec![
            ferrum_questionnaire::urls::LAUNCH_CONTEXT,
            ferrum_questionnaire::urls::LAUNCH_CONTEXT,
            ferrum_questionnaire::urls::VARIABLE,
            "http://example.org/fhir/StructureDefinition/unrelated",
        ]
    );
    let encounter = &lowered["extension"][1]["extension"];
    assert_eq!(encounter[0]["url"], json!("type"));
    assert_eq!(encounter[1]["url"], json!("name"));
    assert_eq!(encounter[1]["valueCoding"]["display"], json!("Encounter"));
}

#[test]
fn legacy_form_is_converted_and_lifted() {
    let text = std::fs::read_to_string(test_data_dir().join("lforms-vitals.json")).unwrap();
    let doc = parse_questionnaire(&text, &LformsConverter).unwrap();

    assert_eq!(doc.title(), Some("Vital signs"));
    assert_eq!(doc.tree.len(), 5);

    let height = doc.tree.get(doc.tree.find_by_link_id("8302-2").unwrap()).unwrap();
    assert_eq!(height.help_text(), Some("Measure without shoes"));
    assert_eq!(height.type_code(), Some("decimal"));

    let panel = doc.tree.find_by_link_id("panel-1").unwrap();
    assert_eq!(doc.tree.children(panel).len(), 2);

    let lowered = to_fhir(&doc);
    assert_eq!(lowered["item"][2]["type"], json!("group"));
    assert_eq!(lowered["item"][0]["item"][0]["linkId"], json!("8302-2_intention"));
    assert_eq!(to_fhir(&lift(&lowered)), lowered);
}
