//! Fake drive tools and a scripted operator for driving sessions in tests.
#![allow(dead_code)]

use discarchive_core::copy::{self, CopyProgress};
use discarchive_core::{
    Config, DiscInfo, DiscKind, DiscTools, DriveStatus, Error, Operator, Result, SessionState,
    StopSignal,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// A scratch area holding a fake mount point and an archive root.
pub struct Workspace {
    pub dir: TempDir,
    pub config: Config,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mount_point = dir.path().join("mnt");
        let archive_root = dir.path().join("archive");
        std::fs::create_dir(&mount_point).unwrap();
        std::fs::create_dir(&archive_root).unwrap();

        let config = Config {
            device: PathBuf::from("/dev/fake-sr0"),
            mount_point,
            poll_interval: Duration::ZERO,
            archive_root,
            ..Config::default()
        };
        Self { dir, config }
    }

    pub fn mount_point(&self) -> &Path {
        &self.config.mount_point
    }

    pub fn archive_root(&self) -> &Path {
        &self.config.archive_root
    }

    /// Names of everything in the archive root, hidden entries included.
    pub fn archive_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.archive_root())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn iso_report(volume: &str) -> String {
    format!(
        "ISO 9660 image: /dev/fake-sr0\nSystem      : LINUX\nVolume      : {}\nVolume Set  :\n",
        volume
    )
}

/// Every call made to [`FakeTools`], in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    DriveStatus,
    DiscKind,
    DiscInfo,
    Mount,
    CopyTree,
    Eject,
}

/// [`DiscTools`] that replays scripted drive answers and copies with the native engine.
pub struct FakeTools {
    pub statuses: RefCell<VecDeque<DriveStatus>>,
    pub kind: DiscKind,
    /// ISO reports handed out by successive `disc_info` calls; the last one repeats.
    pub reports: RefCell<VecDeque<String>>,
    pub fail_copy: bool,
    /// Request a stop on this signal while answering the given (1-based) status query.
    pub stop_at_query: Option<(usize, StopSignal)>,
    pub calls: RefCell<Vec<Call>>,
}

impl FakeTools {
    pub fn new(statuses: &[DriveStatus], reports: &[String]) -> Self {
        Self {
            statuses: RefCell::new(statuses.iter().copied().collect()),
            kind: DiscKind::Data1,
            reports: RefCell::new(reports.iter().cloned().collect()),
            fail_copy: false,
            stop_at_query: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls.borrow().iter().filter(|c| **c == call).count()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl DiscTools for FakeTools {
    fn drive_status(&self) -> Result<DriveStatus> {
        self.record(Call::DriveStatus);
        if let Some((query, signal)) = &self.stop_at_query {
            if self.count(Call::DriveStatus) == *query {
                signal.request_stop();
            }
        }
        Ok(self
            .statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or(DriveStatus::DiscOk))
    }

    fn disc_kind(&self) -> Result<DiscKind> {
        self.record(Call::DiscKind);
        Ok(self.kind)
    }

    fn disc_info(&self) -> Result<DiscInfo> {
        self.record(Call::DiscInfo);
        let mut reports = self.reports.borrow_mut();
        let iso_report = if reports.len() > 1 {
            reports.pop_front().unwrap()
        } else {
            reports.front().cloned().unwrap_or_default()
        };
        Ok(DiscInfo {
            drive_report: "Drive status:   4 (CDS_DISC_OK)\n".to_string(),
            iso_report,
        })
    }

    fn mount(&self) -> Result<()> {
        self.record(Call::Mount);
        Ok(())
    }

    fn copy_tree(
        &self,
        source: &Path,
        destination: &Path,
        signal: &StopSignal,
        progress: &mut dyn CopyProgress,
    ) -> Result<()> {
        self.record(Call::CopyTree);
        if self.fail_copy {
            std::fs::create_dir(destination)?;
            std::fs::write(destination.join("PARTIAL.BIN"), b"half")?;
            return Err(Error::Copy {
                source_dir: source.to_path_buf(),
                destination: destination.to_path_buf(),
                reason: "read error".to_string(),
            });
        }
        copy::copy_tree(source, destination, signal, progress).map(|_| ())
    }

    fn eject(&self) -> Result<()> {
        self.record(Call::Eject);
        Ok(())
    }
}

/// What the scripted operator does at the continue gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtContinue {
    Proceed,
    /// Behave as if Ctrl+C arrived while the prompt was open.
    Interrupt,
}

/// An [`Operator`] answering prompts from a script.
pub struct ScriptedOperator {
    pub signal: StopSignal,
    pub answers: VecDeque<String>,
    /// Continue-gate behavior per disc; once exhausted, interrupts.
    pub at_continue: VecDeque<AtContinue>,
    /// Request a stop from inside the name prompt.
    pub interrupt_at_name: bool,
    /// Request a stop once the copy has got at least this far.
    pub interrupt_after_bytes: Option<u64>,
    pub name_prompts: Vec<String>,
    pub continue_prompts: usize,
    pub states: Vec<SessionState>,
    pub archived: Vec<PathBuf>,
    pub copy_total: Option<u64>,
    pub copied: u64,
}

impl ScriptedOperator {
    pub fn new(signal: StopSignal) -> Self {
        Self {
            signal,
            answers: VecDeque::new(),
            at_continue: VecDeque::new(),
            interrupt_at_name: false,
            interrupt_after_bytes: None,
            name_prompts: Vec::new(),
            continue_prompts: 0,
            states: Vec::new(),
            archived: Vec::new(),
            copy_total: None,
            copied: 0,
        }
    }
}

impl CopyProgress for ScriptedOperator {
    fn copy_started(&mut self, total_bytes: u64) {
        self.copy_total = Some(total_bytes);
    }

    fn copy_progress(&mut self, bytes_copied: u64) {
        self.copied = bytes_copied;
        if self
            .interrupt_after_bytes
            .is_some_and(|limit| bytes_copied >= limit)
        {
            self.signal.request_stop();
        }
    }
}

impl Operator for ScriptedOperator {
    fn state_changed(&mut self, state: SessionState) {
        self.states.push(state);
    }

    fn confirm_name(&mut self, detected: &str) -> Result<String> {
        self.name_prompts.push(detected.to_string());
        if self.interrupt_at_name {
            self.signal.request_stop();
            return Err(Error::Interrupted);
        }
        Ok(self.answers.pop_front().unwrap_or_default())
    }

    fn archived(&mut self, path: &Path) {
        self.archived.push(path.to_path_buf());
    }

    fn confirm_continue(&mut self) -> Result<()> {
        self.continue_prompts += 1;
        match self.at_continue.pop_front().unwrap_or(AtContinue::Interrupt) {
            AtContinue::Proceed => Ok(()),
            AtContinue::Interrupt => {
                self.signal.request_stop();
                Err(Error::Interrupted)
            }
        }
    }
}
