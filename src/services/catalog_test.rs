use super::*;

#[test]
fn embedded_fixture_parses() {
    let catalog = Catalog::embedded().unwrap();
    assert_eq!(catalog.responsible_ai.policies.len(), 4);
    assert_eq!(catalog.responsible_ai.audit_log.len(), 3);
    assert_eq!(catalog.responsible_ai.violations.len(), 3);
    assert_eq!(catalog.templates.len(), 5);
    assert!(!catalog.knowledge.is_empty());
}

#[test]
fn open_violations_skips_resolved() {
    let catalog = Catalog::embedded().unwrap();
    let open: Vec<_> = catalog
        .responsible_ai
        .open_violations()
        .map(|v| v.id.as_str())
        .collect();
    assert_eq!(open, vec!["violation-501"]);
}

#[test]
fn template_lookup_by_id() {
    let catalog = Catalog::embedded().unwrap();
    assert_eq!(catalog.template("template-2").map(|t| t.name), Some("Follow-up"));
    assert!(catalog.template("template-missing").is_none());
}

#[test]
fn load_without_path_uses_embedded() {
    let catalog = Catalog::load(None).unwrap();
    assert_eq!(catalog.responsible_ai, Catalog::embedded().unwrap().responsible_ai);
}

#[test]
fn load_reads_override_file() {
    let path = std::env::temp_dir().join(format!("responsible_ai_{}.json", uuid::Uuid::new_v4()));
    std::fs::write(
        &path,
        r#"{"policies":[{"id":"p","name":"P","description":"d","enabled":false,"threshold":0.25}]}"#,
    )
    .unwrap();

    let catalog = Catalog::load(Some(&path)).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(catalog.responsible_ai.policies.len(), 1);
    assert!(!catalog.responsible_ai.policies[0].enabled);
    assert!(catalog.responsible_ai.audit_log.is_empty());
    assert!(catalog.responsible_ai.violations.is_empty());
}

#[test]
fn load_missing_file_is_read_error() {
    let path = std::env::temp_dir().join(format!("missing_{}.json", uuid::Uuid::new_v4()));
    let err = Catalog::load(Some(&path)).unwrap_err();
    assert!(matches!(err, CatalogError::Read { .. }));
}

#[test]
fn malformed_fixture_is_parse_error() {
    let err = Catalog::from_fixture("{\"policies\": 3}").unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)));
}

#[test]
fn severity_parses_lowercase() {
    let sev: Severity = serde_json::from_str("\"critical\"").unwrap();
    assert_eq!(sev, Severity::Critical);
}
