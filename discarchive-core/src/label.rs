//! Extracts the volume label from the output of the disc inspection utilities.
use crate::error::{Error, Result};
use crate::tools::{DiscInfo, DiscTools};

/// The two leading tokens of the `iso-info` line that carries the volume label.
pub const LABEL_MARKER: [&str; 2] = ["Volume", ":"];

/// The disc reports together with the label found in them.
#[derive(Clone, Debug)]
pub struct DiscLabel {
    pub info: DiscInfo,
    pub volume_name: String,
}

/// Returns the text following the marker tokens, if `line` starts with them.
fn strip_marker(line: &str) -> Option<&str> {
    let mut rest = line;
    for token in LABEL_MARKER {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if &rest[..end] != token {
            return None;
        }
        rest = &rest[end..];
    }
    Some(rest)
}

/// Finds the volume name in an ISO-9660 report.
///
/// The name is everything after `Volume :` on the first line that starts with those two
/// tokens. ISO-9660 pads identifiers with spaces, so surrounding whitespace is dropped.
/// Trailing whitespace is trimmed on purpose: a label can never end in a space here.
///
/// # Errors
///
/// Returns [`Error::LabelNotFound`] if no line carries a non-empty label.
pub fn parse_volume_label(iso_report: &str) -> Result<String> {
    iso_report
        .lines()
        .filter_map(strip_marker)
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or(Error::LabelNotFound)
}

/// Runs the inspection utilities and extracts the disc's volume name.
pub fn read_label<T: DiscTools + ?Sized>(tools: &T) -> Result<DiscLabel> {
    let info = tools.disc_info()?;
    let volume_name = parse_volume_label(&info.iso_report)?;
    tracing::debug!(volume = %volume_name, "Detected volume label");
    Ok(DiscLabel { info, volume_name })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISO_INFO: &str = "\
__________________________________
ISO 9660 image: /dev/sr0
Application : K3B THE CD KREATOR
Preparer    :
Publisher   :
System      : LINUX
Volume      : MY_DISC
Volume Set  :
";

    #[test]
    fn finds_label_line() {
        assert_eq!(parse_volume_label(ISO_INFO).unwrap(), "MY_DISC");
    }

    #[test]
    fn keeps_inner_spaces_and_drops_padding() {
        let report = "Volume : HOLIDAY PHOTOS 2003     \r\n";
        assert_eq!(parse_volume_label(report).unwrap(), "HOLIDAY PHOTOS 2003");
    }

    #[test]
    fn marker_must_be_two_separate_tokens() {
        assert!(matches!(
            parse_volume_label("Volume: MY_DISC\nVolume Set : SET\n"),
            Err(Error::LabelNotFound)
        ));
    }

    #[test]
    fn missing_label_is_an_error() {
        assert!(matches!(
            parse_volume_label("System : LINUX\n"),
            Err(Error::LabelNotFound)
        ));
        assert!(matches!(parse_volume_label(""), Err(Error::LabelNotFound)));
    }

    #[test]
    fn empty_label_line_is_skipped() {
        let report = "Volume      :\nVolume : SECOND\n";
        assert_eq!(parse_volume_label(report).unwrap(), "SECOND");
    }
}
