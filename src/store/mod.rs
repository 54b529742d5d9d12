//! Client for the external issue store.
//!
//! The store is a separate program (configurable, `bd` by default) that
//! speaks JSON on stdout. We only read flat issue records and delegate
//! mutations as single commands; locking, persistence, and retries are the
//! store's problem. Every call spawns a fresh subprocess, so reads are safe
//! to run concurrently with mutations.

use crate::config::StoreConfig;
use crate::data::{IssueRecord, RelationType, Status};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tokio::process::Command;

/// Handle to the store CLI. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CliStore {
    program: String,
    base_args: Vec<String>,
}

impl CliStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            program: config.command.clone(),
            base_args: config.args.clone(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.base_args)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to spawn issue store `{}`", self.program))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "store command `{} {}` failed: {}",
                self.program,
                args.join(" "),
                stderr.trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Fetch all current issue records, relationships included.
    pub async fn list(&self) -> Result<Vec<IssueRecord>> {
        let stdout = self.run(&["list", "--all", "--json"]).await?;
        parse_records(&stdout)
    }

    /// Fetch full detail for a batch of ids.
    pub async fn show(&self, ids: &[String]) -> Result<Vec<IssueRecord>> {
        let mut args = vec!["show", "--json"];
        args.extend(ids.iter().map(String::as_str));
        let stdout = self.run(&args).await?;
        parse_records(&stdout)
    }

    pub async fn set_status(&self, id: &str, status: &Status) -> Result<()> {
        let status: String = status.clone().into();
        self.run(&["update", id, "--status", &status]).await?;
        Ok(())
    }

    pub async fn add_label(&self, id: &str, label: &str) -> Result<()> {
        self.run(&["label", "add", id, label]).await?;
        Ok(())
    }

    pub async fn remove_label(&self, id: &str, label: &str) -> Result<()> {
        self.run(&["label", "remove", id, label]).await?;
        Ok(())
    }

    /// Create an issue, optionally under a parent. Returns the created
    /// record for the optimistic local insert.
    pub async fn create(&self, title: &str, parent: Option<&str>) -> Result<IssueRecord> {
        let mut args = vec!["create", title, "--json"];
        if let Some(parent) = parent {
            args.push("--parent");
            args.push(parent);
        }
        let stdout = self.run(&args).await?;
        let mut records = parse_records(&stdout)?;
        match records.pop() {
            Some(record) if records.is_empty() => Ok(record),
            _ => bail!("store create returned an unexpected payload"),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.run(&["delete", id, "--force"]).await?;
        Ok(())
    }

    pub async fn add_dep(&self, id: &str, target: &str, rel: &RelationType) -> Result<()> {
        self.run(&["dep", "add", id, target, "--type", rel.display_name()])
            .await?;
        Ok(())
    }

    pub async fn remove_dep(&self, id: &str, target: &str) -> Result<()> {
        self.run(&["dep", "remove", id, target]).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListPayload {
    Wrapped { issues: Vec<IssueRecord> },
    Bare(Vec<IssueRecord>),
    Single(Box<IssueRecord>),
}

/// Parse a store JSON payload: a bare array, an `{"issues": [...]}` wrapper,
/// or a single record (as returned by `create`).
pub fn parse_records(payload: &str) -> Result<Vec<IssueRecord>> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let parsed: ListPayload =
        serde_json::from_str(trimmed).context("malformed issue store payload")?;
    Ok(match parsed {
        ListPayload::Wrapped { issues } => issues,
        ListPayload::Bare(issues) => issues,
        ListPayload::Single(issue) => vec![*issue],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RelationType;

    const RECORD: &str = r#"{
        "id": "ab-1",
        "title": "Ship the tree view",
        "status": "in_progress",
        "priority": 1,
        "labels": ["ui"],
        "dependencies": [
            {"id": "ab-2", "type": "blocks"},
            {"id": "ab-3", "type": "parent-child"}
        ],
        "created": "2024-01-01T00:00:00Z",
        "updated": "2024-02-01T00:00:00Z"
    }"#;

    #[test]
    fn test_parse_bare_array() {
        let records = parse_records(&format!("[{RECORD}]")).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id, "ab-1");
        assert_eq!(r.status, Status::InProgress);
        assert_eq!(r.relationships.len(), 2);
        assert_eq!(r.relationships[0].rel_type, RelationType::Blocks);
        assert_eq!(r.relationships[1].target, "ab-3");
    }

    #[test]
    fn test_parse_wrapped_object() {
        let records = parse_records(&format!(r#"{{"issues": [{RECORD}]}}"#)).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_single_record() {
        let records = parse_records(RECORD).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_records("").unwrap().is_empty());
        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_status_and_relation_survive_parsing() {
        let payload = r#"[{
            "id": "ab-9",
            "title": "Future thing",
            "status": "paused",
            "created": "2024-01-01T00:00:00Z",
            "updated": "2024-01-01T00:00:00Z",
            "dependencies": [{"id": "ab-1", "type": "caused-by"}]
        }]"#;
        let records = parse_records(payload).unwrap();
        assert_eq!(records[0].status, Status::Unknown("paused".to_string()));
        assert_eq!(
            records[0].relationships[0].rel_type,
            RelationType::Unknown("caused-by".to_string())
        );
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(parse_records("not json").is_err());
    }
}
