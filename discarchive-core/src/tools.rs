//! The capabilities an archive session needs from the outside world.
//!
//! [`DiscTools`] is the seam between the session logic and the machine: drive status
//! ioctls, the inspection utilities, `mount`, the tree copy and `eject`. The real
//! implementation is [`SystemTools`]; tests substitute fakes.
use crate::config::{Config, CopyMethod};
use crate::copy::{self, CopyProgress};
use crate::error::{Error, Result};
use crate::platform;
use crate::signal::StopSignal;
use crate::status::{DiscKind, DriveStatus};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Raw, human-readable reports about the loaded disc.
#[derive(Clone, Debug, Default)]
pub struct DiscInfo {
    /// Output of `setcd -i`. Empty if the utility could not be run.
    pub drive_report: String,
    /// Output of `iso-info --no-header`. The volume label is parsed from it.
    pub iso_report: String,
}

pub trait DiscTools {
    /// Queries the drive's status.
    fn drive_status(&self) -> Result<DriveStatus>;

    /// Queries the kind of disc currently loaded.
    fn disc_kind(&self) -> Result<DiscKind>;

    /// Collects the inspection utilities' reports for the loaded disc.
    fn disc_info(&self) -> Result<DiscInfo>;

    /// Makes the disc's filesystem available at the configured mount point.
    fn mount(&self) -> Result<()>;

    /// Recursively copies `source` to `destination`, which must not exist yet.
    fn copy_tree(
        &self,
        source: &Path,
        destination: &Path,
        signal: &StopSignal,
        progress: &mut dyn CopyProgress,
    ) -> Result<()>;

    fn eject(&self) -> Result<()>;
}

/// [`DiscTools`] backed by the kernel and the usual command-line utilities.
#[derive(Clone, Debug)]
pub struct SystemTools {
    device: PathBuf,
    mount_point: PathBuf,
    copy_method: CopyMethod,
}

impl SystemTools {
    pub fn new(config: &Config) -> Self {
        Self {
            device: config.device.clone(),
            mount_point: config.mount_point.clone(),
            copy_method: config.copy_method,
        }
    }
}

/// Runs a utility to completion and returns its standard output.
///
/// A non-zero exit status becomes [`Error::Command`] carrying the utility's stderr.
fn run_command<I, S>(program: &str, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::Command {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Command {
            program: program.to_string(),
            reason: format!("{} ({})", stderr.trim(), output.status),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Checks the system mount list for `mount_point`.
fn is_mounted(mount_point: &Path) -> bool {
    let disks = sysinfo::Disks::new_with_refreshed_list();
    disks.iter().any(|disk| disk.mount_point() == mount_point)
}

impl DiscTools for SystemTools {
    fn drive_status(&self) -> Result<DriveStatus> {
        platform::drive_status(&self.device)
    }

    fn disc_kind(&self) -> Result<DiscKind> {
        platform::disc_kind(&self.device)
    }

    fn disc_info(&self) -> Result<DiscInfo> {
        let device = self.device.as_os_str();

        let drive_report = match run_command("setcd", [OsStr::new("-i"), device]) {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Could not read drive report");
                String::new()
            }
        };
        let iso_report = run_command("iso-info", [OsStr::new("--no-header"), device])?;

        Ok(DiscInfo {
            drive_report,
            iso_report,
        })
    }

    fn mount(&self) -> Result<()> {
        if is_mounted(&self.mount_point) {
            debug!(mount_point = %self.mount_point.display(), "Already mounted, skipping mount");
            return Ok(());
        }

        run_command("mount", [&self.device]).map_err(|e| Error::Mount {
            device: self.device.clone(),
            reason: e.to_string(),
        })?;
        debug!(
            device = %self.device.display(),
            mount_point = %self.mount_point.display(),
            "Mounted disc"
        );
        Ok(())
    }

    fn copy_tree(
        &self,
        source: &Path,
        destination: &Path,
        signal: &StopSignal,
        progress: &mut dyn CopyProgress,
    ) -> Result<()> {
        match self.copy_method {
            CopyMethod::Native => copy::copy_tree(source, destination, signal, progress).map(|_| ()),
            CopyMethod::Cp => {
                signal.check()?;
                run_command(
                    "cp",
                    [
                        OsStr::new("-r"),
                        OsStr::new("--preserve=timestamps"),
                        source.as_os_str(),
                        destination.as_os_str(),
                    ],
                )
                .map_err(|e| Error::Copy {
                    source_dir: source.to_path_buf(),
                    destination: destination.to_path_buf(),
                    reason: e.to_string(),
                })?;
                Ok(())
            }
        }
    }

    fn eject(&self) -> Result<()> {
        run_command("eject", [&self.device])?;
        debug!(device = %self.device.display(), "Ejected disc");
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let out = run_command("sh", ["-c", "echo 'Volume      : MY_DISC'"]).unwrap();
        assert_eq!(out, "Volume      : MY_DISC\n");
    }

    #[test]
    fn failure_carries_stderr() {
        let err = run_command("sh", ["-c", "echo 'no medium found' >&2; exit 2"]).unwrap_err();
        match err {
            Error::Command { program, reason } => {
                assert_eq!(program, "sh");
                assert!(reason.contains("no medium found"), "{}", reason);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_program_is_a_command_error() {
        let err = run_command("discarchive-no-such-tool", ["x"]).unwrap_err();
        assert!(matches!(err, Error::Command { .. }));
    }
}
