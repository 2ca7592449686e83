//! Spout template loading and dispatcher wiring

use std::path::PathBuf;
use std::sync::Arc;

use spinnaker_datadog_bridge::datadog::{TemplateFileError, TemplateFormatError};
use spinnaker_datadog_bridge::{
    DispatchResult, Dispatcher, DryRunBackend, Handler, IncomingWebhook, Spout,
};
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn spout_from(path: &std::path::Path) -> Result<(Spout, Arc<DryRunBackend>), TemplateFileError> {
    let backend = Arc::new(DryRunBackend::new());
    let spout = Spout::from_template_file(backend.clone(), backend.clone(), path)?;
    Ok((spout, backend))
}

#[test]
fn test_spout_initialization() {
    // valid template file
    let (spout, _) = spout_from(&fixture("template.json")).unwrap();
    assert_eq!(spout.total_templates(), 1);
    assert_eq!(spout.templates()[0].name, "pipeline-events");
    assert!(spout.validate().is_empty());

    // missing template file
    assert!(matches!(
        spout_from(&fixture("nope.json")),
        Err(TemplateFileError::Read { .. })
    ));

    // badly formatted template file
    assert!(matches!(
        spout_from(&fixture("bad-format.json")),
        Err(TemplateFileError::Parse { .. })
    ));
}

#[test]
fn test_attaching_to_dispatcher() {
    let (spout, _) = spout_from(&fixture("template.json")).unwrap();
    let mut dispatcher = Dispatcher::new();
    spout.attach_to_dispatcher(&mut dispatcher);

    let registered: Vec<&str> = dispatcher.handlers().iter().map(|h| h.name()).collect();
    let from_spout: Vec<String> = spout
        .handlers()
        .iter()
        .map(|h| Handler::name(h.as_ref()).to_string())
        .collect();
    assert_eq!(registered, from_spout);
    assert_eq!(registered, vec!["datadog:pipeline-events"]);
}

#[test]
fn test_spout_initialization_from_yaml() {
    let (yaml, _) = spout_from(&fixture("template.yml")).unwrap();
    let (json, _) = spout_from(&fixture("template.json")).unwrap();
    assert_eq!(yaml.total_templates(), 1);
    assert_eq!(yaml.templates(), json.templates());
    assert!(yaml.validate().is_empty());

    assert!(matches!(
        spout_from(&fixture("nope.yml")),
        Err(TemplateFileError::Read { .. })
    ));
    assert!(matches!(
        spout_from(&fixture("bad-format.yml")),
        Err(TemplateFileError::Parse {
            source: TemplateFormatError::Yaml(_),
            ..
        })
    ));
}

#[test]
fn test_dispatch_fixture_payload() {
    let (spout, backend) = spout_from(&fixture("template.json")).unwrap();
    let mut dispatcher = Dispatcher::new();
    spout.attach_to_dispatcher(&mut dispatcher);

    let body = std::fs::read_to_string(fixture("pipeline_complete.json")).unwrap();
    let incoming = IncomingWebhook::from_json(&body).unwrap();

    let results = dispatcher.dispatch(&incoming);
    assert_eq!(results, vec![("datadog:pipeline-events".to_string(), DispatchResult::Handled)]);
    assert_eq!(backend.event_count(), 1);
    assert_eq!(backend.timing_count(), 1);

    let report = spout.handlers()[0].process(&incoming).unwrap();
    assert_eq!(report.event.title, "someapp: test-pipeline-name SUCCEEDED");
    assert_eq!(
        report.event.text,
        "Execution 01CFAQ5HX3JV0PC1N7E6BGX5JR triggered by testuser@test.tld"
    );
    assert_eq!(
        report.event.tags[5..],
        [
            "pipelineConfigId:c6f20df7-f9ab-45b5-b525-9a67ef2e95b5",
            "execution_status:SUCCEEDED"
        ]
    );
}

#[test]
fn test_broken_template_does_not_stop_other_handlers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("templates.json");
    std::fs::write(
        &path,
        r#"{
            "templates": [
                {"name": "broken", "title": "{{ .Details.Nope }}", "text": "x"},
                {"name": "working", "title": "{{ application }}", "text": "{{ executionId }}"}
            ]
        }"#,
    )
    .unwrap();

    let (spout, backend) = spout_from(&path).unwrap();
    assert!(spout.validate().is_empty(), "unknown fields are a render-time error");

    let mut dispatcher = Dispatcher::new();
    spout.attach_to_dispatcher(&mut dispatcher);

    let mut incoming = IncomingWebhook::default();
    incoming.details.event_type = "orca:stage:starting".to_string();
    let results = dispatcher.dispatch(&incoming);

    assert!(results[0].1.is_failed());
    assert_eq!(results[1].1, DispatchResult::Handled);
    assert_eq!(backend.event_count(), 1);
    assert_eq!(backend.timing_count(), 0);
}

#[test]
fn test_empty_template_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("templates.json");
    std::fs::write(&path, "{}").unwrap();

    let (spout, _) = spout_from(&path).unwrap();
    assert_eq!(spout.total_templates(), 0);
    assert!(spout.handlers().is_empty());
}
