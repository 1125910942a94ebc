use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use finmate_core::{storage::LedgerBackupInfo, CoreError, LedgerStorage};
use finmate_domain::Ledger;

const LEDGER_STEM: &str = "ledger";
const JSON_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed JSON persistence for the ledger snapshot and its backups.
///
/// Layout under `data_dir`: `ledger.json` plus `backups/ledger_<timestamp>[_note].json`.
#[derive(Debug, Clone)]
pub struct JsonLedgerStorage {
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonLedgerStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        Self::with_retention(data_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(data_dir: impl Into<PathBuf>, retention: usize) -> Result<Self, CoreError> {
        let data_dir = data_dir.into();
        let backups_dir = data_dir.join("backups");
        fs::create_dir_all(&data_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            data_dir,
            backups_dir,
            retention: retention.max(1),
        })
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(format!("{LEDGER_STEM}.{JSON_EXTENSION}"))
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Replaces the live ledger with the contents of a backup file.
    pub fn restore_backup(&self, backup: &LedgerBackupInfo) -> Result<Ledger, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::NotFound(format!("backup {}", backup.id)));
        }
        let ledger = load_ledger_from_path(&backup.path)?;
        self.save_ledger(&ledger)?;
        Ok(ledger)
    }

    fn write_backup(&self, contents: BackupSource<'_>, note: Option<&str>) -> Result<LedgerBackupInfo, CoreError> {
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{LEDGER_STEM}_{timestamp}");
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let path = unique_path(&self.backups_dir, &stem);
        match contents {
            BackupSource::Snapshot(ledger) => write_atomic(&path, &serialize_ledger(ledger)?)?,
            BackupSource::File(existing) => {
                fs::copy(existing, &path)?;
            }
        }
        self.prune_backups()?;
        let id = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(LedgerBackupInfo {
            id,
            created_at: timestamp,
            path,
        })
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        let entries = self.list_backups()?;
        for entry in entries.into_iter().skip(self.retention) {
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

enum BackupSource<'a> {
    Snapshot(&'a Ledger),
    File(&'a Path),
}

impl LedgerStorage for JsonLedgerStorage {
    fn save_ledger(&self, ledger: &Ledger) -> Result<(), CoreError> {
        let path = self.ledger_path();
        if path.exists() {
            self.write_backup(BackupSource::File(&path), None)?;
        }
        save_ledger_to_path(ledger, &path)
    }

    fn load_ledger(&self) -> Result<Option<Ledger>, CoreError> {
        let path = self.ledger_path();
        if !path.exists() {
            return Ok(None);
        }
        load_ledger_from_path(&path).map(Some)
    }

    fn backup_ledger(
        &self,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError> {
        self.write_backup(BackupSource::Snapshot(ledger), note)
    }

    /// Newest first.
    fn list_backups(&self) -> Result<Vec<LedgerBackupInfo>, CoreError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(JSON_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let Some(created) = parse_backup_timestamp(file_name) else {
                continue;
            };
            entries.push((
                created,
                LedgerBackupInfo {
                    id: file_name.to_string(),
                    created_at: created.format(BACKUP_TIMESTAMP_FORMAT).to_string(),
                    path: path.clone(),
                },
            ));
        }
        entries.sort_by(|(a_time, a), (b_time, b)| {
            Reverse(a_time)
                .cmp(&Reverse(b_time))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entries.into_iter().map(|(_, info)| info).collect())
    }
}

/// Saves a ledger to an arbitrary path on disk via a temp file and rename.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_ledger(ledger)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a ledger from the provided filesystem path.
pub fn load_ledger_from_path(path: &Path) -> Result<Ledger, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

fn unique_path(dir: &Path, stem: &str) -> PathBuf {
    let mut path = dir.join(format!("{stem}.{JSON_EXTENSION}"));
    let mut counter = 2;
    while path.exists() {
        path = dir.join(format!("{stem}_{counter:03}.{JSON_EXTENSION}"));
        counter += 1;
    }
    path
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !sanitized.is_empty() && !last_dash {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Extracts the timestamp from `ledger_<YYYYmmdd>_<HHMMSS>[...].json`.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let rest = name.strip_prefix(&format!("{LEDGER_STEM}_"))?;
    let raw = rest.get(..15)?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn serialize_ledger(ledger: &Ledger) -> Result<String, CoreError> {
    serde_json::to_string_pretty(ledger).map_err(|err| CoreError::Serde(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_timestamp_parses_with_and_without_note() {
        let plain = parse_backup_timestamp("ledger_20240105_093012.json").unwrap();
        assert_eq!(plain.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-01-05 09:30:12");
        assert!(parse_backup_timestamp("ledger_20240105_093012_before-merge.json").is_some());
        assert!(parse_backup_timestamp("notes.json").is_none());
    }

    #[test]
    fn backup_note_is_slugged() {
        assert_eq!(
            sanitize_backup_note(Some("  Before Merge!! ")).as_deref(),
            Some("before-merge")
        );
        assert_eq!(sanitize_backup_note(Some("***")), None);
    }
}
