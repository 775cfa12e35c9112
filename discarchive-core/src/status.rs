//! Drive and disc status codes, as returned by the Linux cdrom ioctls.
use std::fmt;

// From /usr/include/linux/cdrom.h
const CDS_NO_INFO: i32 = 0;
const CDS_NO_DISC: i32 = 1;
const CDS_TRAY_OPEN: i32 = 2;
const CDS_DRIVE_NOT_READY: i32 = 3;
const CDS_DISC_OK: i32 = 4;
const CDS_AUDIO: i32 = 100;
const CDS_DATA_1: i32 = 101;
const CDS_DATA_2: i32 = 102;
const CDS_XA_2_1: i32 = 103;
const CDS_XA_2_2: i32 = 104;
const CDS_MIXED: i32 = 105;

/// The answer to a `CDROM_DRIVE_STATUS` query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveStatus {
    NoInfo,
    NoDisc,
    TrayOpen,
    NotReady,
    /// A disc is loaded and the drive can read it.
    DiscOk,
    Unknown(i32),
}

impl DriveStatus {
    pub fn is_ready(self) -> bool {
        self == DriveStatus::DiscOk
    }
}

impl From<i32> for DriveStatus {
    fn from(code: i32) -> Self {
        match code {
            CDS_NO_INFO => DriveStatus::NoInfo,
            CDS_NO_DISC => DriveStatus::NoDisc,
            CDS_TRAY_OPEN => DriveStatus::TrayOpen,
            CDS_DRIVE_NOT_READY => DriveStatus::NotReady,
            CDS_DISC_OK => DriveStatus::DiscOk,
            other => DriveStatus::Unknown(other),
        }
    }
}

impl fmt::Display for DriveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveStatus::NoInfo => write!(f, "no information"),
            DriveStatus::NoDisc => write!(f, "no disc"),
            DriveStatus::TrayOpen => write!(f, "tray open"),
            DriveStatus::NotReady => write!(f, "drive not ready"),
            DriveStatus::DiscOk => write!(f, "disc ok"),
            DriveStatus::Unknown(code) => write!(f, "unknown status ({})", code),
        }
    }
}

/// The answer to a `CDROM_DISC_STATUS` query: what kind of tracks the disc holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscKind {
    NoInfo,
    NoDisc,
    Audio,
    Data1,
    Data2,
    Xa21,
    Xa22,
    Mixed,
    Unknown(i32),
}

impl DiscKind {
    /// Whether the disc may carry a filesystem worth archiving.
    ///
    /// Only an audio-only disc is ruled out. `NoInfo` and unknown codes are given
    /// the benefit of the doubt since some drives report them for DVDs.
    pub fn has_data(self) -> bool {
        !matches!(self, DiscKind::Audio | DiscKind::NoDisc)
    }
}

impl From<i32> for DiscKind {
    fn from(code: i32) -> Self {
        match code {
            CDS_NO_INFO => DiscKind::NoInfo,
            CDS_NO_DISC => DiscKind::NoDisc,
            CDS_AUDIO => DiscKind::Audio,
            CDS_DATA_1 => DiscKind::Data1,
            CDS_DATA_2 => DiscKind::Data2,
            CDS_XA_2_1 => DiscKind::Xa21,
            CDS_XA_2_2 => DiscKind::Xa22,
            CDS_MIXED => DiscKind::Mixed,
            other => DiscKind::Unknown(other),
        }
    }
}

impl fmt::Display for DiscKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscKind::NoInfo => write!(f, "no information"),
            DiscKind::NoDisc => write!(f, "no disc"),
            DiscKind::Audio => write!(f, "audio"),
            DiscKind::Data1 => write!(f, "data (mode 1)"),
            DiscKind::Data2 => write!(f, "data (mode 2)"),
            DiscKind::Xa21 => write!(f, "XA (mode 2 form 1)"),
            DiscKind::Xa22 => write!(f, "XA (mode 2 form 2)"),
            DiscKind::Mixed => write!(f, "mixed audio/data"),
            DiscKind::Unknown(code) => write!(f, "unknown type ({})", code),
        }
    }
}
