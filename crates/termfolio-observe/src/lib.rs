use anyhow::Result;
use chrono::Utc;
use serde_json::json;
use std::cell::Cell;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use termfolio_core::{ConsoleEvent, runtime_dir};

/// Append-only session log under `<workspace>/.termfolio/observe.log`.
pub struct Observer {
    log_path: PathBuf,
    seq: Cell<u64>,
    verbose: bool,
    quiet: bool,
}

impl Observer {
    pub fn new(workspace: &Path) -> Result<Self> {
        let dir = runtime_dir(workspace);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            log_path: dir.join("observe.log"),
            seq: Cell::new(0),
            verbose: false,
            quiet: false,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn record_event(&self, event: &ConsoleEvent) -> Result<()> {
        let seq_no = self.seq.get() + 1;
        self.seq.set(seq_no);
        self.append_log_line(&format!(
            "{} EVENT {}",
            Utc::now().to_rfc3339(),
            json!({ "seq_no": seq_no, "event": event })
        ))
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Suppress stderr output while the terminal is in raw mode.
    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    /// Log to stderr with a `[termfolio]` prefix when verbose; also kept in
    /// the log file.
    pub fn verbose_log(&self, msg: &str) {
        if !self.verbose {
            return;
        }
        if !self.quiet {
            eprintln!("[termfolio] {msg}");
        }
        let _ = self.append_log_line(&format!("{} DEBUG {msg}", Utc::now().to_rfc3339()));
    }

    /// Always written to the log file; echoed to stderr unless quiet.
    pub fn warn_log(&self, msg: &str) {
        if !self.quiet {
            eprintln!("[termfolio WARN] {msg}");
        }
        let _ = self.append_log_line(&format!("{} WARN {msg}", Utc::now().to_rfc3339()));
    }

    fn append_log_line(&self, line: &str) -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use termfolio_core::Command;

    fn observer() -> (TempDir, Observer) {
        let workspace = TempDir::new().expect("tempdir");
        let observer = Observer::new(workspace.path()).expect("observer");
        (workspace, observer)
    }

    fn submitted() -> ConsoleEvent {
        ConsoleEvent::CommandSubmitted {
            input: "help".to_string(),
            command: Command::Help,
        }
    }

    #[test]
    fn creates_runtime_dir() {
        let (workspace, observer) = observer();
        assert!(workspace.path().join(".termfolio").is_dir());
        assert_eq!(
            observer.log_path(),
            workspace.path().join(".termfolio").join("observe.log")
        );
    }

    #[test]
    fn events_are_numbered_json_lines() {
        let (_workspace, observer) = observer();
        observer.record_event(&submitted()).expect("record 1");
        observer
            .record_event(&ConsoleEvent::ScreenCleared)
            .expect("record 2");

        let log = fs::read_to_string(observer.log_path()).expect("read log");
        let lines: Vec<&str> = log.lines().filter(|l| l.contains(" EVENT ")).collect();
        assert_eq!(lines.len(), 2);

        let payload = lines[0].split_once(" EVENT ").expect("payload").1;
        let value: serde_json::Value = serde_json::from_str(payload).expect("json");
        assert_eq!(value["seq_no"], 1);
        assert_eq!(value["event"]["kind"], "command_submitted");
        assert_eq!(value["event"]["command"], "help");
        assert!(lines[1].contains(r#""seq_no":2"#));
        assert!(lines[1].contains("screen_cleared"));
    }

    #[test]
    fn verbose_is_off_by_default_and_toggles() {
        let (_workspace, mut observer) = observer();
        assert!(!observer.is_verbose());
        observer.verbose_log("hidden");
        observer.set_verbose(true);
        observer.set_quiet(true);
        observer.verbose_log("shown");
        let log = fs::read_to_string(observer.log_path()).expect("read log");
        assert!(!log.contains("hidden"));
        assert!(log.contains("DEBUG shown"));
    }

    #[test]
    fn warn_log_always_reaches_the_file() {
        let (_workspace, mut observer) = observer();
        observer.set_quiet(true);
        observer.warn_log("opener missing");
        let log = fs::read_to_string(observer.log_path()).expect("read log");
        assert!(log.contains("WARN opener missing"));
    }
}
