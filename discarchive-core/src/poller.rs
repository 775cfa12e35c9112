//! Waits for a readable data disc to appear in the drive.
use crate::error::Result;
use crate::signal::StopSignal;
use crate::status::{DiscKind, DriveStatus};
use crate::tools::DiscTools;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Blocks until the drive holds a disc with data on it, checking every `interval`.
///
/// There is no retry limit. The only ways out are a ready disc, a failed status query,
/// or a stop request, which returns [`crate::Error::Interrupted`].
pub fn wait_ready<T: DiscTools + ?Sized>(
    tools: &T,
    interval: Duration,
    signal: &StopSignal,
) -> Result<()> {
    wait_ready_with(tools, interval, signal, thread::sleep)
}

/// Like [`wait_ready`], with the pause between two queries supplied by the caller.
pub fn wait_ready_with<T, S>(
    tools: &T,
    interval: Duration,
    signal: &StopSignal,
    mut sleep: S,
) -> Result<()>
where
    T: DiscTools + ?Sized,
    S: FnMut(Duration),
{
    let mut last_status: Option<DriveStatus> = None;
    let mut last_kind: Option<DiscKind> = None;

    loop {
        signal.check()?;

        let status = tools.drive_status()?;
        if last_status != Some(status) {
            debug!(%status, "Drive status changed");
            last_status = Some(status);
        }

        if status.is_ready() {
            let kind = tools.disc_kind()?;
            if kind.has_data() {
                info!(%kind, "Disc ready");
                return Ok(());
            }
            if last_kind != Some(kind) {
                debug!(%kind, "Disc has no data tracks, still waiting");
                last_kind = Some(kind);
            }
        } else {
            last_kind = None;
        }

        sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copy::CopyProgress;
    use crate::error::Error;
    use crate::tools::DiscInfo;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::path::Path;

    struct ScriptedDrive {
        statuses: RefCell<VecDeque<DriveStatus>>,
        kind: DiscKind,
        queries: RefCell<usize>,
    }

    impl ScriptedDrive {
        fn new(statuses: &[DriveStatus], kind: DiscKind) -> Self {
            Self {
                statuses: RefCell::new(statuses.iter().copied().collect()),
                kind,
                queries: RefCell::new(0),
            }
        }
    }

    impl DiscTools for ScriptedDrive {
        fn drive_status(&self) -> Result<DriveStatus> {
            *self.queries.borrow_mut() += 1;
            Ok(self
                .statuses
                .borrow_mut()
                .pop_front()
                .unwrap_or(DriveStatus::NoDisc))
        }

        fn disc_kind(&self) -> Result<DiscKind> {
            Ok(self.kind)
        }

        fn disc_info(&self) -> Result<DiscInfo> {
            unreachable!()
        }

        fn mount(&self) -> Result<()> {
            unreachable!()
        }

        fn copy_tree(
            &self,
            _: &Path,
            _: &Path,
            _: &StopSignal,
            _: &mut dyn CopyProgress,
        ) -> Result<()> {
            unreachable!()
        }

        fn eject(&self) -> Result<()> {
            unreachable!()
        }
    }

    #[test]
    fn disc_ok_proceeds_without_sleeping() {
        let drive = ScriptedDrive::new(&[DriveStatus::DiscOk], DiscKind::Data1);
        let mut sleeps = 0;
        wait_ready_with(&drive, Duration::from_secs(5), &StopSignal::new(), |_| sleeps += 1)
            .unwrap();
        assert_eq!(sleeps, 0);
        assert_eq!(*drive.queries.borrow(), 1);
    }

    #[test]
    fn keeps_waiting_until_disc_ok() {
        let drive = ScriptedDrive::new(
            &[
                DriveStatus::NoInfo,
                DriveStatus::NoDisc,
                DriveStatus::TrayOpen,
                DriveStatus::NotReady,
                DriveStatus::Unknown(9),
                DriveStatus::DiscOk,
            ],
            DiscKind::Mixed,
        );
        let mut slept = Vec::new();
        wait_ready_with(&drive, Duration::from_secs(5), &StopSignal::new(), |d| slept.push(d))
            .unwrap();
        assert_eq!(slept, vec![Duration::from_secs(5); 5]);
    }

    #[test]
    fn audio_disc_is_never_ready() {
        let drive = ScriptedDrive::new(&[DriveStatus::DiscOk; 3], DiscKind::Audio);
        let signal = StopSignal::new();
        let mut sleeps = 0;
        let result = wait_ready_with(&drive, Duration::ZERO, &signal, |_| {
            sleeps += 1;
            if sleeps == 3 {
                signal.request_stop();
            }
        });
        assert!(matches!(result, Err(Error::Interrupted)));
        assert_eq!(*drive.queries.borrow(), 3);
    }

    #[test]
    fn stop_prevents_further_queries() {
        let drive = ScriptedDrive::new(&[DriveStatus::DiscOk], DiscKind::Data1);
        let signal = StopSignal::new();
        signal.request_stop();
        let result = wait_ready_with(&drive, Duration::ZERO, &signal, |_| {});
        assert!(matches!(result, Err(Error::Interrupted)));
        assert_eq!(*drive.queries.borrow(), 0);
    }
}
