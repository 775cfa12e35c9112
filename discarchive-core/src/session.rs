//! The archive session loop: wait, label, confirm, archive, confirm, eject, repeat.
use crate::archive;
use crate::config::Config;
use crate::copy::CopyProgress;
use crate::error::Result;
use crate::label;
use crate::poller;
use crate::signal::StopSignal;
use crate::tools::{DiscInfo, DiscTools};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where the session is within one disc's cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Waiting,
    Labeled,
    ConfirmingName,
    Archiving,
    ConfirmingContinue,
    Ejecting,
    /// Terminal. Reached only through an interrupt.
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Waiting => "waiting for disc",
            SessionState::Labeled => "labeled",
            SessionState::ConfirmingName => "confirming name",
            SessionState::Archiving => "archiving",
            SessionState::ConfirmingContinue => "confirming continue",
            SessionState::Ejecting => "ejecting",
            SessionState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// How a session's stop was carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    /// The session ejected the disc itself.
    Ejected,
    /// Another holder of the [`StopSignal`] had claimed the eject and owns the shutdown.
    EjectClaimedElsewhere,
}

/// The person at the drive.
///
/// The two prompts are required; the notification hooks default to doing nothing.
pub trait Operator: CopyProgress {
    fn state_changed(&mut self, _state: SessionState) {}

    /// Shows the raw disc reports once a disc has been labeled.
    fn disc_detected(&mut self, _info: &DiscInfo) {}

    /// Asks whether to keep the detected name. Returns the operator's override, which
    /// is empty to accept `detected`.
    fn confirm_name(&mut self, detected: &str) -> Result<String>;

    fn archived(&mut self, _path: &Path) {}

    /// Pacing gate before the eject. The answer carries no meaning.
    fn confirm_continue(&mut self) -> Result<()>;
}

/// Applies the operator's answer to the name prompt.
///
/// A non-empty override always wins. Surrounding whitespace is not significant, so an
/// answer of only spaces keeps the detected name.
pub fn resolve_volume_name(detected: &str, answer: &str) -> String {
    let answer = answer.trim();
    if answer.is_empty() {
        detected.to_string()
    } else {
        answer.to_string()
    }
}

/// Drives discs through the archive cycle until a stop is requested.
pub struct Session<'a, T: DiscTools + ?Sized, O: Operator> {
    config: &'a Config,
    tools: &'a T,
    operator: O,
    signal: StopSignal,
    state: SessionState,
}

impl<'a, T: DiscTools + ?Sized, O: Operator> Session<'a, T, O> {
    pub fn new(config: &'a Config, tools: &'a T, operator: O, signal: StopSignal) -> Self {
        Self {
            config,
            tools,
            operator,
            signal,
            state: SessionState::Waiting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    pub fn into_operator(self) -> O {
        self.operator
    }

    /// Archives disc after disc until interrupted.
    ///
    /// Returns once a stop has been handled, with the session in
    /// [`SessionState::Stopped`]. The outcome says whether this session ejected the disc
    /// or another holder of the [`StopSignal`] had already claimed that eject. Any other
    /// failure is returned as is, without ejecting.
    pub fn run(&mut self) -> Result<StopOutcome> {
        loop {
            match self.cycle() {
                Ok(path) => debug!(archive = %path.display(), "Cycle complete"),
                Err(e) if e.is_interrupted() || self.signal.is_stop_requested() => {
                    return Ok(self.stop());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Runs one disc through the cycle, from waiting to ejected.
    pub fn cycle(&mut self) -> Result<PathBuf> {
        self.enter(SessionState::Waiting)?;
        poller::wait_ready(self.tools, self.config.poll_interval, &self.signal)?;
        self.signal.check()?;
        let label = label::read_label(self.tools)?;

        self.enter(SessionState::Labeled)?;
        self.operator.disc_detected(&label.info);

        self.enter(SessionState::ConfirmingName)?;
        let answer = self.operator.confirm_name(&label.volume_name)?;
        let volume_name = resolve_volume_name(&label.volume_name, &answer);

        self.enter(SessionState::Archiving)?;
        let path = archive::run(
            self.tools,
            self.config,
            &volume_name,
            &self.signal,
            &mut self.operator,
        )?;
        self.operator.archived(&path);

        self.enter(SessionState::ConfirmingContinue)?;
        self.operator.confirm_continue()?;

        self.enter(SessionState::Ejecting)?;
        self.tools.eject()?;
        Ok(path)
    }

    fn enter(&mut self, state: SessionState) -> Result<()> {
        self.signal.check()?;
        debug!(from = %self.state, to = %state, "Session state changed");
        self.state = state;
        self.operator.state_changed(state);
        Ok(())
    }

    fn stop(&mut self) -> StopOutcome {
        self.signal.request_stop();
        self.state = SessionState::Stopped;
        self.operator.state_changed(SessionState::Stopped);

        if !self.signal.claim_eject() {
            debug!("Eject already claimed, leaving shutdown to its owner");
            return StopOutcome::EjectClaimedElsewhere;
        }

        info!("Stop requested, ejecting disc");
        if let Err(e) = self.tools.eject() {
            warn!(error = %e, "Eject during shutdown failed");
        }
        StopOutcome::Ejected
    }
}
