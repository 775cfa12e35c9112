//! The closed set of failures the core library can report.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Every way an archive session can fail.
///
/// Only [`Error::Interrupted`] is recovered from: the session loop treats it as the
/// request to eject and stop. Every other variant is returned to the caller unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// The device node could not be opened or did not answer a status ioctl.
    #[error("failed to query status of {device}: {source}")]
    StatusQuery {
        device: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The ISO report contained no `Volume :` line.
    #[error("no volume label found in disc info output")]
    LabelNotFound,

    /// An external utility could not be started or exited unsuccessfully.
    #[error("`{program}` failed: {reason}")]
    Command { program: String, reason: String },

    #[error("failed to mount {device}: {reason}")]
    Mount { device: PathBuf, reason: String },

    #[error("failed to copy {source_dir} to {destination}: {reason}")]
    Copy {
        source_dir: PathBuf,
        destination: PathBuf,
        reason: String,
    },

    /// The archive destination is already taken.
    #[error("archive destination {0} already exists")]
    NameCollision(PathBuf),

    /// The volume name is not usable as a single directory name.
    #[error("invalid volume name {0:?}")]
    InvalidName(String),

    #[error("verification failed: {0}")]
    Verify(String),

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("operation cancelled by user")]
    Interrupted,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns `true` if this error is the stop signal surfacing, not a real failure.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Interrupted)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
