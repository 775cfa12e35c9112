use crate::error::{Error, Result};
use crate::status::{DiscKind, DriveStatus};
use std::io;
use std::path::Path;

fn unsupported(device: &Path) -> Error {
    Error::StatusQuery {
        device: device.to_path_buf(),
        source: io::Error::new(
            io::ErrorKind::Unsupported,
            "optical drive status queries are only implemented for Linux",
        ),
    }
}

pub fn drive_status(device: &Path) -> Result<DriveStatus> {
    Err(unsupported(device))
}

pub fn disc_kind(device: &Path) -> Result<DiscKind> {
    Err(unsupported(device))
}
