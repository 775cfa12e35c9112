//! The core, UI-agnostic library for the `discarchive` optical disc archiving utility.
//!
//! `discarchive-core` is designed to be used as a library by any front-end, whether it's
//! a command-line interface (like `discarchive`) or something else. It handles drive
//! polling, volume label extraction, mounting, copying with timestamps preserved,
//! and ejecting.
//!
//! The library is structured into several key modules:
//! - [`status`]: The drive and disc status codes reported by the kernel.
//! - [`platform`]: Platform-specific drive status queries (`ioctl` on Linux).
//! - [`tools`]: The [`DiscTools`] capability trait and its real implementation,
//!   [`SystemTools`], which shells out to `iso-info`, `mount`, `cp` and `eject`.
//! - [`poller`]: Waits for a readable data disc.
//! - [`label`]: Extracts the volume label from the disc reports.
//! - [`mod@copy`] and [`verify`]: The native tree copy and its optional verification.
//! - [`archive`]: Stages, copies and names one disc's archive.
//! - [`session`]: The loop that drives disc after disc through the cycle.
//!
//! Progress and prompts go through the [`Operator`] trait, so the calling application
//! decides how to present them.
//!
//! ## Example: Archiving Discs Until Interrupted
//!
//! ```rust,no_run
//! use discarchive_core::{Config, CopyProgress, Operator, Session, StopSignal, SystemTools};
//! use std::path::Path;
//!
//! struct AcceptAll;
//!
//! impl CopyProgress for AcceptAll {
//!     fn copy_progress(&mut self, bytes_copied: u64) {
//!         println!("{} bytes copied", bytes_copied);
//!     }
//! }
//!
//! impl Operator for AcceptAll {
//!     fn confirm_name(&mut self, _detected: &str) -> discarchive_core::Result<String> {
//!         Ok(String::new())
//!     }
//!
//!     fn archived(&mut self, path: &Path) {
//!         println!("Archived to {}", path.display());
//!     }
//!
//!     fn confirm_continue(&mut self) -> discarchive_core::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> discarchive_core::Result<()> {
//!     let config = Config::default();
//!     let tools = SystemTools::new(&config);
//!
//!     // Another thread (e.g. a Ctrl+C handler) calls `request_stop` on a clone.
//!     let signal = StopSignal::new();
//!
//!     let outcome = Session::new(&config, &tools, AcceptAll, signal).run()?;
//!     println!("Stopped: {:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod archive;
mod config;
pub mod copy;
mod error;
pub mod label;
pub mod platform;
pub mod poller;
pub mod session;
mod signal;
pub mod status;
pub mod tools;
pub mod verify;

pub use config::{Config, CopyMethod, DEFAULT_DEVICE, DEFAULT_MOUNT_POINT, DEFAULT_POLL_INTERVAL};
pub use copy::CopyProgress;
pub use error::{Error, Result};
pub use label::DiscLabel;
pub use session::{Operator, Session, SessionState, StopOutcome};
pub use signal::StopSignal;
pub use status::{DiscKind, DriveStatus};
pub use tools::{DiscInfo, DiscTools, SystemTools};
