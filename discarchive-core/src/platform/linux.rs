use crate::error::{Error, Result};
use crate::status::{DiscKind, DriveStatus};
use nix::{ioctl_none_bad, ioctl_write_int_bad};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

// Request codes from /usr/include/linux/cdrom.h
const CDROM_DRIVE_STATUS: libc::c_ulong = 0x5326;
const CDROM_DISC_STATUS: libc::c_ulong = 0x5327;

/// Slot argument meaning "whatever disc is in the drive right now".
const CDSL_CURRENT: libc::c_int = libc::c_int::MAX;

ioctl_write_int_bad!(cdrom_drive_status, CDROM_DRIVE_STATUS);
ioctl_none_bad!(cdrom_disc_status, CDROM_DISC_STATUS);

/// Opens the device node without waiting for media.
///
/// `O_NONBLOCK` is what lets the status ioctls work on an empty drive or an open tray.
fn open_device(device: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(device)
        .map_err(|source| Error::StatusQuery {
            device: device.to_path_buf(),
            source,
        })
}

/// Asks the drive whether a readable disc is loaded.
///
/// The device is opened for this single query and closed again before returning.
pub fn drive_status(device: &Path) -> Result<DriveStatus> {
    let file = open_device(device)?;
    let code = unsafe { cdrom_drive_status(file.as_raw_fd(), CDSL_CURRENT) }.map_err(|e| {
        Error::StatusQuery {
            device: device.to_path_buf(),
            source: io::Error::from(e),
        }
    })?;
    Ok(DriveStatus::from(code))
}

/// Asks the drive what kind of tracks the loaded disc holds.
pub fn disc_kind(device: &Path) -> Result<DiscKind> {
    let file = open_device(device)?;
    let code =
        unsafe { cdrom_disc_status(file.as_raw_fd()) }.map_err(|e| Error::StatusQuery {
            device: device.to_path_buf(),
            source: io::Error::from(e),
        })?;
    Ok(DiscKind::from(code))
}
