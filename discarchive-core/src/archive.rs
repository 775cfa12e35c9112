//! Contains the logic for copying a mounted disc into a named archive directory.
//!
//! The copy goes into a hidden staging directory inside the archive root first, so a
//! directory with the final name only ever appears once the whole tree is in place.
use crate::config::Config;
use crate::copy::CopyProgress;
use crate::error::{Error, Result};
use crate::signal::StopSignal;
use crate::tools::DiscTools;
use crate::verify;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::info;

const STAGING_PREFIX: &str = ".discarchive-";
/// Name of the copied tree inside the staging directory.
const STAGED_TREE: &str = "contents";

/// Checks that `name` can be used as a single directory name.
pub fn validate_volume_name(name: &str) -> Result<()> {
    let invalid = || Error::InvalidName(name.to_string());

    if name.contains('\0') {
        return Err(invalid());
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains('/') => Ok(()),
        _ => Err(invalid()),
    }
}

/// Returns where the archive for `volume_name` would be created.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] for names that are not a single path component and
/// [`Error::NameCollision`] if the destination already exists.
pub fn destination(config: &Config, volume_name: &str) -> Result<PathBuf> {
    validate_volume_name(volume_name)?;
    let path = config.archive_root.join(volume_name);
    if path.symlink_metadata().is_ok() {
        return Err(Error::NameCollision(path));
    }
    Ok(path)
}

/// Mounts the disc and copies its whole tree into `<archive_root>/<volume_name>`.
///
/// The mount point is copied into a fresh staging directory, optionally verified, and
/// then renamed into place. The staging directory is removed on success and on every
/// error this function returns.
///
/// # Arguments
///
/// * `tools` - Performs the mount and the tree copy.
/// * `config` - Supplies the mount point, archive root and verification setting.
/// * `volume_name` - The confirmed name of the archive directory.
/// * `signal` - Checked between steps and during the copy.
/// * `progress` - Receives copy progress.
///
/// # Errors
///
/// This function will return an error if:
/// - The name is invalid or already taken.
/// - The disc cannot be mounted or copied.
/// - Verification is enabled and the copy differs from the disc.
/// - The operation is cancelled.
pub fn run<T: DiscTools + ?Sized>(
    tools: &T,
    config: &Config,
    volume_name: &str,
    signal: &StopSignal,
    progress: &mut dyn CopyProgress,
) -> Result<PathBuf> {
    let final_path = destination(config, volume_name)?;

    tools.mount()?;
    signal.check()?;

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(&config.archive_root)?;
    let staged = staging.path().join(STAGED_TREE);
    info!(
        source = %config.mount_point.display(),
        staging = %staging.path().display(),
        "Copying disc"
    );

    tools.copy_tree(&config.mount_point, &staged, signal, progress)?;

    if config.verify {
        verify::verify_tree(&config.mount_point, &staged, signal)?;
    }
    signal.check()?;

    // The name may have been taken while the copy was running.
    if final_path.symlink_metadata().is_ok() {
        return Err(Error::NameCollision(final_path));
    }
    fs::rename(&staged, &final_path)?;
    staging.close()?;

    info!(archive = %final_path.display(), "Archive complete");
    Ok(final_path)
}
