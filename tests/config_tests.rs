//! Config file loading, validation and CLI-style overrides.

use cache_code_updater::config::{
    self, AppConfig, AppConfigBuilder, ConfigFileError, OutputFormat, Validatable,
};
use cache_code_updater::model::ScriptSource;
use cache_code_updater::rebase::Rebaser;
use tempfile::TempDir;

fn write_config(dir: &TempDir, yaml: &str) -> std::path::PathBuf {
    let path = dir.path().join("updater.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn explicit_file_is_loaded() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(
        &tmp,
        "pipeline:\n  version: '231'\n  workers: 3\nrebase:\n  adjust_var_counts: true\n",
    );

    let (config, loaded_from) = config::load_or_default(Some(&path)).unwrap();
    assert_eq!(loaded_from, Some(path));
    assert_eq!(config.pipeline.version.as_deref(), Some("231"));
    assert_eq!(config.pipeline.workers, Some(3));
    assert!(config.rebase.adjust_var_counts);
    // unspecified rebase fields keep their defaults
    assert_eq!(config.rebase.symbol_groups.len(), 3);
    assert!(config.is_valid());
}

#[test]
fn broken_explicit_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(&tmp, "pipeline: [not, a, map]\n");
    assert!(matches!(
        config::load_or_default(Some(&path)),
        Err(ConfigFileError::Parse(_))
    ));

    let missing = tmp.path().join("absent.yaml");
    assert!(matches!(
        config::load_or_default(Some(&missing)),
        Err(ConfigFileError::NotFound(_))
    ));
}

#[test]
fn validation_reports_every_problem() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(
        &tmp,
        "matching:\n  record_fields:\n    name: -1.0\npipeline:\n  workers: 0\n  lost_id: 0\n",
    );
    let config = config::load_config_file(&path).unwrap();

    let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
    assert_eq!(
        fields,
        vec![
            "matching.record_fields.name",
            "pipeline.workers",
            "pipeline.lost_id"
        ]
    );
}

#[test]
fn generated_examples_validate() {
    for yaml in [
        config::generate_example_config(),
        config::generate_full_example_config(),
    ] {
        let config: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert!(config.validate().is_empty(), "{yaml}");
    }
}

#[test]
fn schema_describes_every_section() {
    let schema: serde_json::Value =
        serde_json::from_str(&config::generate_json_schema()).unwrap();
    let properties = schema["properties"].as_object().unwrap();
    for section in ["matching", "rebase", "pipeline", "output"] {
        assert!(properties.contains_key(section), "missing {section}");
    }
}

#[test]
fn builder_overrides_only_what_it_is_told() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(&tmp, "pipeline:\n  workers: 2\n  version: '230'\n");
    let base = config::load_config_file(&path).unwrap();

    let config = AppConfigBuilder::from_config(base)
        .dry_run(true)
        .version("231")
        .format(OutputFormat::Json)
        .build();

    assert_eq!(config.pipeline.workers, Some(2));
    assert!(config.pipeline.dry_run);
    assert_eq!(config.pipeline.version.as_deref(), Some("231"));
    assert_eq!(config.output.format, OutputFormat::Json);
    assert!(config.pipeline.validate_output);
}

#[test]
fn configured_slot_group_drives_rebasing() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(
        &tmp,
        r"
rebase:
  symbol_groups:
    - name: label
      kind: label
    - name: long
      kind: slot
      opcodes: [lload, lstore]
      count_directive: .long_var_count
",
    );
    let config = config::load_config_file(&path).unwrap();
    assert!(config.is_valid());

    let ov = ScriptSource::parse(".id 1\n.long_var_count 1\n   lload 0\n   return\n").unwrap();
    let nv = ScriptSource::parse(
        ".id 1\n.long_var_count 2\n   iconst 5\n   pop_int\n   lload 0\n   return\n",
    )
    .unwrap();
    let om = ScriptSource::parse(
        ".id 1\n.long_var_count 2\n   lload 0\n   lstore 1\n   return\n",
    )
    .unwrap();

    let rebased = Rebaser::new(config.rebase).rebase(&ov, &nv, &om);
    let body: Vec<String> = rebased
        .body
        .iter()
        .map(|t| t.to_string().split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    assert_eq!(
        body,
        vec!["iconst 5", "pop_int", "lload 0", "lstore 2", "return"]
    );
}
