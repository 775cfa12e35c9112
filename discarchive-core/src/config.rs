use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DEVICE: &str = "/dev/sr0";
pub const DEFAULT_MOUNT_POINT: &str = "/media/cdrom0";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How the disc's file tree is copied into the staging directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CopyMethod {
    /// In-process recursive copy with progress reporting.
    #[default]
    Native,
    /// `cp -r --preserve=timestamps`.
    Cp,
}

impl fmt::Display for CopyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyMethod::Native => write!(f, "native"),
            CopyMethod::Cp => write!(f, "cp"),
        }
    }
}

/// Settings shared by every stage of an archive session.
///
/// These are fixed for the lifetime of the process and passed by reference to the
/// poller, the label reader and the archiver.
#[derive(Clone, Debug)]
pub struct Config {
    /// The optical drive's device node (e.g., `/dev/sr0`).
    pub device: PathBuf,
    /// Where the mount table exposes the disc once `mount <device>` has run.
    pub mount_point: PathBuf,
    /// Delay between two drive status queries.
    pub poll_interval: Duration,
    /// Directory in which staging directories and finished archives are created.
    pub archive_root: PathBuf,
    pub copy_method: CopyMethod,
    /// Hash-compare every copied file against the disc before finalizing.
    pub verify: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            mount_point: PathBuf::from(DEFAULT_MOUNT_POINT),
            poll_interval: DEFAULT_POLL_INTERVAL,
            archive_root: PathBuf::from("."),
            copy_method: CopyMethod::default(),
            verify: false,
        }
    }
}
