//! Subcommand implementations

use crate::config::Config;
use anyhow::{bail, Context, Result};
use ferrum_fhir_client::{
    DocumentSink, DocumentSource, FhirClient, FileDocument, SearchParams, ServerDocument,
    TerminologyClient,
};
use ferrum_models::IssueSeverity;
use ferrum_questionnaire::prune::prune_empty;
use ferrum_questionnaire::publish::{self, PublishMode, UserProfile};
use ferrum_questionnaire::{
    check, default_document, duplicate_document, to_fhir, EditorDocument, NodeId,
};
use ferrum_session::{AutosaveOutcome, EditSession, FileStore, LoadOutcome};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

async fn load(path: &Path) -> Result<EditorDocument> {
    FileDocument::new(path)
        .load()
        .await
        .with_context(|| format!("Failed to load {}", path.display()))
}

async fn read_json(path: &Path) -> Result<Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not JSON", path.display()))
}

/// Pretty JSON to `output`, or stdout
async fn emit(value: &Value, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            FileDocument::new(path)
                .save(value)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, value)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn depth(doc: &EditorDocument, mut id: NodeId) -> usize {
    let mut depth = 0;
    while let Some(parent) = doc.tree.parent(id) {
        depth += 1;
        id = parent;
    }
    depth
}

fn print_outline(doc: &EditorDocument) {
    println!(
        "{} ({} items)",
        doc.title().unwrap_or("<untitled>"),
        doc.tree.len()
    );
    for id in doc.tree.walk() {
        let Some(node) = doc.tree.get(id) else { continue };
        let mut line = format!(
            "{}- {} [{}]",
            "  ".repeat(depth(doc, id)),
            node.link_id().unwrap_or("<no linkId>"),
            node.type_code().unwrap_or("?")
        );
        if let Some(text) = node.text() {
            line.push(' ');
            line.push_str(text);
        }
        if node.is_hidden() {
            line.push_str(" (hidden)");
        }
        if !node.enable_when.is_empty() {
            line.push_str(&format!(" ({} conditions)", node.enable_when.len()));
        }
        println!("{}", line);
    }
}

fn report_diagnostics(doc: &EditorDocument) -> bool {
    let diagnostics = check(doc);
    for diagnostic in &diagnostics {
        println!("warning: {}", diagnostic);
    }
    diagnostics.is_empty()
}

pub async fn lift(file: &Path) -> Result<bool> {
    let doc = load(file).await?;
    print_outline(&doc);
    report_diagnostics(&doc);
    Ok(true)
}

pub async fn lower(file: &Path, output: Option<&Path>) -> Result<bool> {
    let doc = load(file).await?;
    emit(&to_fhir(&doc), output).await?;
    Ok(true)
}

/// Lift and lower `file`, reporting whether anything beyond empty members
/// changed
pub async fn roundtrip(file: &Path) -> Result<bool> {
    let mut expected = read_json(file).await?;
    let doc = load(file).await?;
    let lowered = to_fhir(&doc);

    if lowered == expected {
        println!("identical");
        return Ok(true);
    }
    prune_empty(&mut expected);
    if lowered == expected {
        println!("identical after removing empty members");
        return Ok(true);
    }
    let mut changed = Vec::new();
    diff("", &expected, &lowered, &mut changed);
    for path in &changed {
        println!("changed: {}", if path.is_empty() { "/" } else { path });
    }
    Ok(false)
}

fn diff(path: &str, left: &Value, right: &Value, out: &mut Vec<String>) {
    match (left, right) {
        (Value::Object(a), Value::Object(b)) => {
            for (key, value) in a {
                let child = format!("{}/{}", path, key);
                match b.get(key) {
                    Some(other) => diff(&child, value, other, out),
                    None => out.push(child),
                }
            }
            for key in b.keys().filter(|k| !a.contains_key(*k)) {
                out.push(format!("{}/{}", path, key));
            }
        }
        (Value::Array(a), Value::Array(b)) if a.len() == b.len() => {
            for (i, (x, y)) in a.iter().zip(b).enumerate() {
                diff(&format!("{}/{}", path, i), x, y, out);
            }
        }
        _ if left != right => out.push(path.to_string()),
        _ => {}
    }
}

pub async fn prune(file: &Path, output: Option<&Path>) -> Result<bool> {
    let mut value = read_json(file).await?;
    prune_empty(&mut value);
    emit(&value, output).await?;
    Ok(true)
}

pub async fn check_file(file: &Path) -> Result<bool> {
    let doc = load(file).await?;
    let clean = report_diagnostics(&doc);
    if clean {
        println!("no problems found");
    }
    Ok(clean)
}

pub async fn new(from: Option<&Path>, regenerate: bool, output: Option<&Path>) -> Result<bool> {
    let doc = match from {
        Some(path) => duplicate_document(&load(path).await?, regenerate)?,
        None => default_document()?,
    };
    emit(&to_fhir(&doc), output).await?;
    Ok(true)
}

pub async fn pull(config: &Config, id: &str, output: Option<&Path>) -> Result<bool> {
    let client = Arc::new(FhirClient::new(&config.server_client())?);
    let doc = ServerDocument::new(client, Some(id.to_string()))
        .load()
        .await
        .with_context(|| format!("Failed to read Questionnaire/{}", id))?;
    emit(&to_fhir(&doc), output).await?;
    Ok(true)
}

pub async fn push(config: &Config, file: &Path, update: bool, user: UserProfile) -> Result<bool> {
    let doc = load(file).await?;
    if !report_diagnostics(&doc) {
        tracing::warn!("Publishing a questionnaire with dangling references");
    }
    let mut resource = to_fhir(&doc);
    let mode = if update {
        PublishMode::Update
    } else {
        PublishMode::Create
    };
    let user = (user.display_name.is_some()).then_some(&user);
    publish::prepare(&mut resource, mode, &config.publish_options(), user)?;

    let client = FhirClient::new(&config.server_client())?;
    let stored = match mode {
        PublishMode::Create => client.create(&resource).await,
        PublishMode::Update => client.update(&resource).await,
    }
    .context("Server rejected the questionnaire")?;

    println!(
        "{}/Questionnaire/{} (version {})",
        client.base_url(),
        stored["id"].as_str().unwrap_or("?"),
        stored.pointer("/meta/versionId").and_then(Value::as_str).unwrap_or("?")
    );
    Ok(true)
}

pub async fn validate(config: &Config, file: &Path) -> Result<bool> {
    let doc = load(file).await?;
    let client = FhirClient::new(&config.server_client())?;
    let outcome = client.validate(&to_fhir(&doc)).await?;

    for issue in &outcome.issue {
        let severity = match issue.severity {
            IssueSeverity::Fatal => "fatal",
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Information => "information",
        };
        println!(
            "{}: {}{}",
            severity,
            issue.diagnostics.as_deref().unwrap_or(&issue.code),
            if issue.expression.is_empty() {
                String::new()
            } else {
                format!(" at {}", issue.expression.join(", "))
            }
        );
    }
    Ok(!outcome.has_errors())
}

pub async fn search(config: &Config, params: SearchParams, pages: usize) -> Result<bool> {
    let client = FhirClient::new(&config.server_client())?;
    let mut bundle = client.search(&params).await?;
    if let Some(total) = bundle.total {
        println!("{} questionnaires", total);
    }
    for page in 0..pages.max(1) {
        for resource in bundle.resources() {
            println!(
                "{}\t{}\t{}",
                resource["id"].as_str().unwrap_or("?"),
                resource["status"].as_str().unwrap_or("?"),
                resource["title"].as_str().unwrap_or("")
            );
        }
        if page + 1 == pages.max(1) {
            break;
        }
        match client.page(&bundle, "next").await? {
            Some(next) => bundle = next,
            None => break,
        }
    }
    Ok(true)
}

pub async fn expand(config: &Config, url: &str, filter: Option<&str>) -> Result<bool> {
    let client = TerminologyClient::new(&config.terminology_client(), config.terminology.cache_size)?;
    let codings = client.expand(url, filter).await?;
    for coding in &codings {
        println!(
            "{}\t{}\t{}",
            coding.system.as_deref().unwrap_or(""),
            coding.code.as_deref().unwrap_or(""),
            coding.display.as_deref().unwrap_or("")
        );
    }
    Ok(!codings.is_empty())
}

pub enum SessionAction {
    Import { file: PathBuf, yes: bool },
    Show,
    Step { name: String },
    Export { output: Option<PathBuf> },
    Discard,
}

pub async fn session(config: &Config, action: SessionAction) -> Result<bool> {
    let store = Arc::new(FileStore::new(&config.session.state_dir));
    let mut session = EditSession::new(store, config.autosave_options()).await?;
    let restored = session.restore().await?;
    tracing::debug!(restored, dir = %config.session.state_dir.display(), "Session opened");

    match action {
        SessionAction::Import { file, yes } => {
            let source = FileDocument::new(&file);
            if session.load_from(&source, yes).await? == LoadOutcome::NeedsConfirmation {
                bail!("The auto-saved session has edits; pass --yes to replace it");
            }
            if session.schedule_autosave().await?? != AutosaveOutcome::Saved {
                bail!("Auto-save was superseded");
            }
            print_outline(session.model());
        }
        SessionAction::Show => {
            if !restored {
                println!("no auto-saved session");
                return Ok(true);
            }
            if let Some(step) = session.step() {
                println!("step: {}", step);
            }
            print_outline(session.model());
            report_diagnostics(session.model());
        }
        SessionAction::Step { name } => {
            session.set_step(name);
            session.save_now().await?;
        }
        SessionAction::Export { output } => {
            if !restored {
                bail!("There is no auto-saved session to export");
            }
            emit(&session.lower(), output.as_deref()).await?;
        }
        SessionAction::Discard => {
            session.discard_autosave().await?;
            println!("auto-saved session discarded");
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn diff_reports_changed_paths() {
        let left = json!({"title": "A", "item": [{"linkId": "a"}], "status": "draft"});
        let right = json!({"title": "B", "item": [{"linkId": "a", "type": "string"}]});
        let mut out = Vec::new();
        diff("", &left, &right, &mut out);
        assert_eq!(out, vec!["/title", "/item/0/type", "/status"].into_iter().map(String::from).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn session_import_then_export() {
        let dir = tempfile::tempdir().unwrap();
        let form = dir.path().join("form.json");
        let raw = json!({
            "resourceType": "Questionnaire",
            "status": "draft",
            "title": "Intake",
            "item": [{"linkId": "a", "type": "string", "text": "A"}]
        });
        std::fs::write(&form, raw.to_string()).unwrap();

        let mut config = Config::default();
        config.session.state_dir = dir.path().join("state");
        config.session.debounce_ms = 1;

        assert!(session(&config, SessionAction::Import { file: form.clone(), yes: false }).await.unwrap());
        assert!(session(&config, SessionAction::Import { file: form.clone(), yes: false }).await.is_err());

        let out = dir.path().join("out.json");
        session(&config, SessionAction::Export { output: Some(out.clone()) }).await.unwrap();
        let exported: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(exported, raw);

        session(&config, SessionAction::Discard).await.unwrap();
        assert!(session(&config, SessionAction::Export { output: None }).await.is_err());
    }
}
