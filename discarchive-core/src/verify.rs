//! Compares a staged copy against the disc it was taken from.
use crate::copy::{EntryKind, scan_tree};
use crate::error::{Error, Result};
use crate::signal::StopSignal;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tracing::info;

const BUFFER_SIZE: usize = 1024 * 1024; // 1 MiB

fn hash_file(path: &Path, signal: &StopSignal, buffer: &mut [u8]) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    loop {
        signal.check()?;
        let n = file.read(buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hasher.finalize().to_vec())
}

/// Checks that every regular file under `source` exists under `copy` with the same
/// size and SHA-256 digest.
///
/// Returns the number of files verified.
///
/// # Errors
///
/// Returns [`Error::Verify`] naming the first file that is missing or differs.
pub fn verify_tree(source: &Path, copy: &Path, signal: &StopSignal) -> Result<usize> {
    let scan = scan_tree(source)?;
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut verified = 0;

    for entry in &scan.entries {
        let EntryKind::File(size) = entry.kind else {
            continue;
        };
        let copied = copy.join(&entry.relative);

        let copied_len = fs::metadata(&copied)
            .map_err(|e| Error::Verify(format!("{}: {}", entry.relative.display(), e)))?
            .len();
        if copied_len != size {
            return Err(Error::Verify(format!(
                "{}: size mismatch ({} != {})",
                entry.relative.display(),
                copied_len,
                size
            )));
        }

        let expected = hash_file(&source.join(&entry.relative), signal, &mut buffer)?;
        let actual = hash_file(&copied, signal, &mut buffer)?;
        if expected != actual {
            return Err(Error::Verify(format!(
                "{}: hash mismatch",
                entry.relative.display()
            )));
        }
        verified += 1;
    }

    info!(files = verified, "Verified staged copy");
    Ok(verified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tree(root: &Path, contents: &[u8]) {
        fs::create_dir_all(root.join("SUB")).unwrap();
        fs::write(root.join("SUB/FILE.DAT"), contents).unwrap();
    }

    #[test]
    fn identical_trees_pass() {
        let dir = tempdir().unwrap();
        tree(&dir.path().join("a"), b"same");
        tree(&dir.path().join("b"), b"same");

        let verified =
            verify_tree(&dir.path().join("a"), &dir.path().join("b"), &StopSignal::new()).unwrap();
        assert_eq!(verified, 1);
    }

    #[test]
    fn differing_content_fails() {
        let dir = tempdir().unwrap();
        tree(&dir.path().join("a"), b"same");
        tree(&dir.path().join("b"), b"diff");

        let result = verify_tree(&dir.path().join("a"), &dir.path().join("b"), &StopSignal::new());
        assert!(matches!(result, Err(Error::Verify(msg)) if msg.contains("hash mismatch")));
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempdir().unwrap();
        tree(&dir.path().join("a"), b"same");
        fs::create_dir(dir.path().join("b")).unwrap();

        let result = verify_tree(&dir.path().join("a"), &dir.path().join("b"), &StopSignal::new());
        assert!(matches!(result, Err(Error::Verify(_))));
    }
}
