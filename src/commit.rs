use crate::{config, modules::ModuleList};
use anyhow::{Context, Result};
use serde::Serialize;
use std::{fmt, fs, io, path::Path};
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Every inactive module collapses onto this sentinel rank.
pub const INACTIVE_RANK: &str = "99";

const ACTIVE_MODE: u32 = 0o744;
const INACTIVE_MODE: u32 = 0o644;

/// One planned rename plus permission change for a single module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOp {
    pub from: String,
    pub to: String,
    pub active: bool,
}

#[derive(Debug, Error)]
pub enum CommitErrorKind {
    #[error("rename failed: {0}")]
    Rename(#[source] io::Error),
    #[error("permission change failed: {0}")]
    Permissions(#[source] io::Error),
}

/// A failed operation, kept whole so it can be reported after the
/// loop instead of being discarded.
#[derive(Debug)]
pub struct CommitFailure {
    pub op: RenameOp,
    pub error: CommitErrorKind,
}

impl fmt::Display for CommitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.op.from, self.op.to, self.error)
    }
}

#[derive(Debug, Default)]
pub struct CommitReport {
    pub applied: Vec<RenameOp>,
    pub failures: Vec<CommitFailure>,
}

impl CommitReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Walk the final order and derive one operation per module: dense
/// two-digit ranks for active entries, the sentinel for inactive.
pub fn plan(modules: &ModuleList) -> Vec<RenameOp> {
    let mut next_rank = 1usize;
    let mut ops = Vec::with_capacity(modules.len());
    for module in modules.iter() {
        let rank = if module.active {
            let rank = format!("{next_rank:02}");
            next_rank += 1;
            rank
        } else {
            INACTIVE_RANK.to_string()
        };
        ops.push(RenameOp {
            from: module.file_name(),
            to: format!("{rank}_{}", module.identity),
            active: module.active,
        });
    }
    ops
}

/// Execute the plan against `dir`. Each operation runs independently;
/// a failure never blocks the remaining operations.
pub fn apply(dir: &Path, ops: Vec<RenameOp>) -> CommitReport {
    let mut report = CommitReport::default();
    for op in ops {
        match apply_one(dir, &op) {
            Ok(()) => report.applied.push(op),
            Err(error) => report.failures.push(CommitFailure { op, error }),
        }
    }
    report
}

fn apply_one(dir: &Path, op: &RenameOp) -> Result<(), CommitErrorKind> {
    let from = dir.join(&op.from);
    let to = dir.join(&op.to);
    fs::rename(&from, &to).map_err(CommitErrorKind::Rename)?;
    let mode = if op.active { ACTIVE_MODE } else { INACTIVE_MODE };
    set_mode(&to, mode).map_err(CommitErrorKind::Permissions)?;
    Ok(())
}

fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CommitMeta {
    timestamp: String,
    applied: usize,
    failed: usize,
    failures: Vec<String>,
}

/// Persist a summary of the last commit under the data dir.
pub fn save_report(report: &CommitReport) -> Result<()> {
    let dir = config::data_dir()?;
    fs::create_dir_all(&dir).context("create data dir")?;
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format commit timestamp")?;
    let meta = CommitMeta {
        timestamp,
        applied: report.applied.len(),
        failed: report.failures.len(),
        failures: report.failures.iter().map(CommitFailure::to_string).collect(),
    };
    let raw = serde_json::to_string_pretty(&meta).context("serialize commit report")?;
    fs::write(dir.join("last_commit.json"), raw).context("write commit report")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::Module;
    use std::fs;
    use tempfile::TempDir;

    fn module(file_name: &str, active: bool) -> Module {
        Module::from_file_name(file_name, file_name.to_string(), active)
    }

    #[test]
    fn plan_assigns_dense_ranks_and_the_inactive_sentinel() {
        let modules = ModuleList::new(vec![
            module("a", true),
            module("b", false),
            module("c", true),
        ]);
        let ops = plan(&modules);
        assert_eq!(
            ops,
            vec![
                RenameOp {
                    from: "a".into(),
                    to: "01_a".into(),
                    active: true
                },
                RenameOp {
                    from: "b".into(),
                    to: "99_b".into(),
                    active: false
                },
                RenameOp {
                    from: "c".into(),
                    to: "02_c".into(),
                    active: true
                },
            ]
        );
    }

    #[test]
    fn plan_reconstructs_old_ranked_paths() {
        let modules = ModuleList::new(vec![module("07_net", true), module("99_disk", false)]);
        let ops = plan(&modules);
        assert_eq!(ops[0].from, "07_net");
        assert_eq!(ops[0].to, "01_net");
        assert_eq!(ops[1].from, "99_disk");
        assert_eq!(ops[1].to, "99_disk");
    }

    #[test]
    fn plan_counts_only_active_modules() {
        let modules = ModuleList::new(vec![
            module("a", false),
            module("b", true),
            module("c", false),
            module("d", true),
        ]);
        let ops = plan(&modules);
        let ranks: Vec<&str> = ops
            .iter()
            .map(|op| op.to.split_once('_').unwrap().0)
            .collect();
        assert_eq!(ranks, ["99", "01", "99", "02"]);
    }

    #[cfg(unix)]
    #[test]
    fn apply_renames_and_sets_permission_bits() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("02_b"), "x").unwrap();
        fs::write(tmp.path().join("01_a"), "x").unwrap();

        // final order: b first (active), a second (inactive)
        let modules = ModuleList::new(vec![module("02_b", true), module("01_a", false)]);
        let report = apply(tmp.path(), plan(&modules));

        assert!(report.is_clean());
        assert_eq!(report.applied.len(), 2);
        assert!(tmp.path().join("01_b").exists());
        assert!(tmp.path().join("99_a").exists());

        let active_mode = fs::metadata(tmp.path().join("01_b"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(active_mode & 0o777, 0o744);
        let inactive_mode = fs::metadata(tmp.path().join("99_a"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(inactive_mode & 0o777, 0o644);
    }

    #[test]
    fn one_failure_does_not_block_the_rest() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("01_real"), "x").unwrap();

        let modules = ModuleList::new(vec![module("01_ghost", true), module("01_real", true)]);
        let report = apply(tmp.path(), plan(&modules));

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            CommitErrorKind::Rename(_)
        ));
        assert_eq!(report.applied.len(), 1);
        assert!(tmp.path().join("02_real").exists());
    }
}
