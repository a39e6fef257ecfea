//! Command implementations. Each returns the process exit code.

use crate::cli::{Cli, Commands, SnapshotArgs};
use crate::errors::{exit_code_for_match, EXIT_SUCCESS, EXIT_USAGE_ERROR};
use crate::output;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;
use winedition::platform::{host_metrics, host_platform};
use winedition::{
    ClassifierConfig, EditionClassifier, FixedMetrics, ServerRole, VersionSnapshot,
};

pub fn load_config(path: Option<&Path>) -> Result<ClassifierConfig> {
    match path {
        Some(path) => ClassifierConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => ClassifierConfig::load().context("loading config from $WINEDITION_CONFIG"),
    }
}

pub fn run(cli: Cli, config: &ClassifierConfig) -> Result<i32> {
    let classifier = config.build_classifier().context("building classifier")?;

    match cli.command {
        Commands::Classify { source, json } => classify(classifier, &source, json),
        Commands::Check { edition, source } => check(classifier, &edition, &source),
        Commands::Role { role, source } => role_check(classifier, role, &source),
        Commands::Rules { json, toml } => rules(&classifier, json, toml),
    }
}

pub fn read_snapshot(path: &Path) -> Result<VersionSnapshot> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading snapshot {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing snapshot {}", path.display()))
}

/// Saved snapshots use fixed metrics; the live machine uses its own.
fn acquire(
    classifier: EditionClassifier,
    source: &SnapshotArgs,
) -> Result<(EditionClassifier, VersionSnapshot)> {
    match &source.snapshot {
        Some(path) => {
            let snapshot = read_snapshot(path)?;
            let metrics = source
                .metrics
                .iter()
                .fold(FixedMetrics::new(), |m, (id, value)| m.with(*id, *value));
            Ok((classifier.with_metrics(metrics), snapshot))
        }
        None => {
            let platform = host_platform().context("capturing live snapshot")?;
            let snapshot =
                VersionSnapshot::capture(&platform).context("capturing live snapshot")?;
            info!("classifying live system {}", snapshot.version_string());
            Ok((classifier.with_boxed_metrics(host_metrics()), snapshot))
        }
    }
}

fn classify(classifier: EditionClassifier, source: &SnapshotArgs, json: bool) -> Result<i32> {
    let (classifier, snapshot) = acquire(classifier, source)?;
    let report = classifier.classify(snapshot);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", output::format_classification(&report));
    }
    Ok(exit_code_for_match(report.marketing_name.is_some()))
}

fn check(classifier: EditionClassifier, edition: &str, source: &SnapshotArgs) -> Result<i32> {
    if classifier.rules().get(edition).is_none() {
        eprintln!("Unknown edition {:?}. Run `wineditionctl rules` to list editions.", edition);
        return Ok(EXIT_USAGE_ERROR);
    }

    let (classifier, snapshot) = acquire(classifier, source)?;
    let matched = classifier.is_edition(edition, &snapshot);
    println!("{}: {}", edition, if matched { "yes" } else { "no" });
    Ok(exit_code_for_match(matched))
}

fn role_check(classifier: EditionClassifier, role: ServerRole, source: &SnapshotArgs) -> Result<i32> {
    let (classifier, snapshot) = acquire(classifier, source)?;
    let matched = classifier.is_server_role(role, &snapshot);
    println!("{}: {}", role, if matched { "yes" } else { "no" });
    Ok(exit_code_for_match(matched))
}

fn rules(classifier: &EditionClassifier, json: bool, toml: bool) -> Result<i32> {
    let table = classifier.rules();
    if json {
        println!("{}", serde_json::to_string_pretty(table)?);
    } else if toml {
        print!("{}", table.to_toml_string()?);
    } else {
        println!("{}", output::format_rules(table));
    }
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"major_version": 6, "minor_version": 1, "build_number": 7601, "product_type": "workstation", "service_pack_major": 1, "sku": 48}}"#
        )
        .unwrap();

        let snap = read_snapshot(file.path()).unwrap();
        assert_eq!(snap.build_number(), 7601);
        assert_eq!(snap.service_pack_major(), 1);
        assert_eq!(snap.sku(), 48);
    }

    #[test]
    fn test_read_snapshot_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = read_snapshot(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing snapshot"));
    }

    #[test]
    fn test_acquire_applies_metric_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"major_version": 5, "minor_version": 2, "build_number": 3790, "product_type": "other_server", "sku": 7}}"#
        )
        .unwrap();

        let source = SnapshotArgs {
            snapshot: Some(file.path().to_path_buf()),
            metrics: vec![(winedition::SM_SERVERR2, 1)],
        };
        let (classifier, snap) = acquire(EditionClassifier::new(), &source).unwrap();
        assert_eq!(
            classifier.resolve_marketing_name(&snap),
            Some("Windows Server 2003 R2")
        );
    }

    #[test]
    fn test_missing_config_file_is_error() {
        assert!(load_config(Some(Path::new("/nonexistent/winedition.toml"))).is_err());
    }
}
