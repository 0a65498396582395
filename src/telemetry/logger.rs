//! # State Logger
//!
//! Writes one JSON object per successful poll:
//!
//! ```text
//! {"timestamp":"2024-05-01T12:00:00.000Z","poll":42,"controller_type":115,"state":{...}}
//! ```
//!
//! Files are named `psx-<YYYYmmdd-HHMMSS>-<seq>.jsonl`. Only files created by
//! this logger are ever pruned.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::TelemetryConfig;
use crate::controller::ControllerState;
use crate::error::Result;

#[derive(Serialize)]
struct StateRecord<'a> {
    timestamp: DateTime<Utc>,
    poll: u64,
    controller_type: Option<u8>,
    state: &'a ControllerState,
}

/// Rotating JSONL writer for decoded controller states
pub struct StateLogger {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    files: VecDeque<PathBuf>,
    file_seq: u64,
}

impl StateLogger {
    /// Create a logger writing into `dir` (created if missing)
    ///
    /// No file is opened until the first record.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory cannot be created.
    pub fn new<P: AsRef<Path>>(
        dir: P,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        info!("Telemetry logging to {}", dir.display());

        Ok(Self {
            dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer: None,
            records_in_file: 0,
            files: VecDeque::new(),
            file_seq: 0,
        })
    }

    /// Create a logger from the `[telemetry]` section
    ///
    /// # Errors
    ///
    /// Returns `Io` if the log directory cannot be created.
    pub fn from_config(config: &TelemetryConfig) -> Result<Self> {
        Self::new(&config.log_dir, config.max_records_per_file, config.max_files_to_keep)
    }

    /// Append one state record, rotating files as needed
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Telemetry` if writing fails.
    pub fn record(
        &mut self,
        poll: u64,
        controller_type: Option<u8>,
        state: &ControllerState,
    ) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let record = StateRecord {
            timestamp: Utc::now(),
            poll,
            controller_type,
            state,
        };

        if let Some(writer) = self.writer.as_mut() {
            serde_json::to_writer(&mut *writer, &record)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        self.records_in_file += 1;

        Ok(())
    }

    /// Files currently retained, oldest first
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        self.file_seq += 1;
        let name = format!(
            "psx-{}-{:04}.jsonl",
            Utc::now().format("%Y%m%d-%H%M%S"),
            self.file_seq
        );
        let path = self.dir.join(name);

        let file = File::create(&path)?;
        debug!("Opened telemetry file {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;
        self.files.push_back(path);

        while self.files.len() > self.max_files_to_keep {
            if let Some(old) = self.files.pop_front() {
                if let Err(e) = fs::remove_file(&old) {
                    warn!("Failed to remove old telemetry file {}: {}", old.display(), e);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::state::Buttons;
    use tempfile::TempDir;

    fn state_with_cross() -> ControllerState {
        ControllerState::new(
            Buttons {
                cross: true,
                ..Buttons::default()
            },
            72,
            0,
            -3,
            0,
        )
    }

    fn files_in(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_no_file_until_first_record() {
        let dir = TempDir::new().unwrap();
        let logger = StateLogger::new(dir.path(), 10, 2).unwrap();

        assert_eq!(logger.files().count(), 0);
        assert!(files_in(dir.path()).is_empty());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        StateLogger::new(&nested, 10, 2).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_record_writes_json_line() {
        let dir = TempDir::new().unwrap();
        let mut logger = StateLogger::new(dir.path(), 10, 2).unwrap();

        logger.record(7, Some(0x73), &state_with_cross()).unwrap();

        let files = files_in(dir.path());
        assert_eq!(files.len(), 1);

        let contents = fs::read_to_string(&files[0]).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);

        let json: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(json["poll"], 7);
        assert_eq!(json["controller_type"], 0x73);
        assert_eq!(json["state"]["buttons"]["cross"], true);
        assert_eq!(json["state"]["left_stick_x"], 72);
        assert_eq!(json["state"]["right_stick_x"], -3);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_rotation_and_retention() {
        let dir = TempDir::new().unwrap();
        let mut logger = StateLogger::new(dir.path(), 2, 2).unwrap();

        for poll in 0..5 {
            logger.record(poll, None, &ControllerState::neutral()).unwrap();
        }

        // 5 records at 2 per file → 3 files created, oldest pruned
        let retained: Vec<PathBuf> = logger.files().map(Path::to_path_buf).collect();
        assert_eq!(retained.len(), 2);
        assert_eq!(files_in(dir.path()).len(), 2);

        let first = fs::read_to_string(&retained[0]).unwrap();
        let last = fs::read_to_string(&retained[1]).unwrap();
        assert_eq!(first.lines().count(), 2);
        assert_eq!(last.lines().count(), 1);

        let json: serde_json::Value = serde_json::from_str(last.lines().next().unwrap()).unwrap();
        assert_eq!(json["poll"], 4);
        assert!(json["controller_type"].is_null());
    }

    #[test]
    fn test_foreign_files_are_kept() {
        let dir = TempDir::new().unwrap();
        let foreign = dir.path().join("notes.txt");
        fs::write(&foreign, "keep me").unwrap();

        let mut logger = StateLogger::new(dir.path(), 1, 1).unwrap();
        for poll in 0..3 {
            logger.record(poll, None, &ControllerState::neutral()).unwrap();
        }

        assert!(foreign.exists());
        assert_eq!(files_in(dir.path()).len(), 2);
    }

    #[test]
    fn test_from_config() {
        let dir = TempDir::new().unwrap();
        let config = TelemetryConfig {
            enabled: true,
            log_dir: dir.path().join("telemetry").to_string_lossy().to_string(),
            max_records_per_file: 100,
            max_files_to_keep: 3,
        };

        let mut logger = StateLogger::from_config(&config).unwrap();
        logger.record(1, None, &ControllerState::neutral()).unwrap();
        assert_eq!(logger.files().count(), 1);
    }
}
