use crate::{
    config::TITLE_MARKER,
    modules::{Module, ModuleList},
};
use anyhow::{bail, Context, Result};
use std::{collections::HashSet, fs, path::Path};
use walkdir::WalkDir;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Scan outcome: the ordered list plus anything worth telling the
/// operator about (modules without a readable title line).
#[derive(Debug, Default)]
pub struct ScanReport {
    pub modules: ModuleList,
    pub warnings: Vec<String>,
}

/// Build the initial ordered list from the module directory. Entries
/// sort by rank token; rank-less files come first, in scan order.
pub fn scan_modules(dir: &Path) -> Result<ScanReport> {
    if !dir.is_dir() {
        bail!("invalid module directory: {}", dir.display());
    }

    let mut entries = Vec::new();
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.context("read module directory")?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let active = is_executable(entry.path())
            .with_context(|| format!("stat {}", entry.path().display()))?;
        let title = read_title(entry.path());
        let module = match title {
            Some(title) => Module::from_file_name(&file_name, title, active),
            None => {
                let module = Module::from_file_name(&file_name, String::new(), active);
                warnings.push(format!("No title marker in {file_name}"));
                Module {
                    title: format!("! Undefined ! ({})", module.identity),
                    ..module
                }
            }
        };
        if !seen.insert(module.identity.clone()) {
            bail!(
                "duplicate module identity '{}' in {}",
                module.identity,
                dir.display()
            );
        }
        entries.push(module);
    }

    entries.sort_by(|a, b| a.rank.cmp(&b.rank));

    Ok(ScanReport {
        modules: ModuleList::new(entries),
        warnings,
    })
}

/// First line carrying the title marker wins; the remainder of the
/// line, trimmed, is the title.
fn read_title(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    for line in raw.lines() {
        if let Some(idx) = line.find(TITLE_MARKER) {
            let title = line[idx + TITLE_MARKER.len()..].trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }
    None
}

fn is_executable(path: &Path) -> Result<bool> {
    let meta = fs::metadata(path)?;
    #[cfg(unix)]
    {
        Ok(meta.permissions().mode() & 0o100 != 0)
    }
    #[cfg(not(unix))]
    {
        let _ = meta;
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_module(dir: &Path, name: &str, title: Option<&str>, mode: u32) {
        let path = dir.join(name);
        let body = match title {
            Some(title) => format!("#!/bin/sh\n# TITLE: {title}\necho run\n"),
            None => "#!/bin/sh\necho run\n".to_string(),
        };
        fs::write(&path, body).unwrap();
        #[cfg(unix)]
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        #[cfg(not(unix))]
        let _ = mode;
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = scan_modules(&tmp.path().join("nope"));
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn scan_orders_by_rank_with_rankless_first() {
        let tmp = TempDir::new().unwrap();
        write_module(tmp.path(), "02_late", Some("Late"), 0o744);
        write_module(tmp.path(), "01_early", Some("Early"), 0o644);
        write_module(tmp.path(), "loose", Some("Loose"), 0o744);

        let report = scan_modules(tmp.path()).unwrap();
        let names: Vec<_> = report
            .modules
            .iter()
            .map(|m| m.identity.clone())
            .collect();
        assert_eq!(names, ["loose", "early", "late"]);
        assert!(report.warnings.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn exec_bit_drives_the_active_flag() {
        let tmp = TempDir::new().unwrap();
        write_module(tmp.path(), "01_on", Some("On"), 0o744);
        write_module(tmp.path(), "02_off", Some("Off"), 0o644);

        let report = scan_modules(tmp.path()).unwrap();
        assert!(report.modules.get(0).unwrap().active);
        assert!(!report.modules.get(1).unwrap().active);
    }

    #[cfg(unix)]
    #[test]
    fn missing_title_falls_back_and_warns() {
        let tmp = TempDir::new().unwrap();
        write_module(tmp.path(), "01_silent", None, 0o644);

        let report = scan_modules(tmp.path()).unwrap();
        let module = report.modules.get(0).unwrap();
        assert_eq!(module.title, "! Undefined ! (silent)");
        assert_eq!(report.warnings.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn single_digit_rank_is_padded() {
        let tmp = TempDir::new().unwrap();
        write_module(tmp.path(), "1_first", Some("First"), 0o744);

        let report = scan_modules(tmp.path()).unwrap();
        let module = report.modules.get(0).unwrap();
        assert_eq!(module.rank.as_deref(), Some("01"));
        assert_eq!(module.identity, "first");
    }

    #[cfg(unix)]
    #[test]
    fn duplicate_identities_are_rejected() {
        let tmp = TempDir::new().unwrap();
        write_module(tmp.path(), "01_same", Some("A"), 0o744);
        write_module(tmp.path(), "02_same", Some("B"), 0o744);

        let result = scan_modules(tmp.path());
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn subdirectories_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write_module(tmp.path(), "01_real", Some("Real"), 0o744);
        fs::create_dir(tmp.path().join("nested")).unwrap();

        let report = scan_modules(tmp.path()).unwrap();
        assert_eq!(report.modules.len(), 1);
    }
}
