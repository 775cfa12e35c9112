//! Provides platform-specific functionality.
//!
//! This module holds the parts of drive handling that talk to the kernel directly,
//! which today is the drive and disc status queries.
//!
//! It uses conditional compilation (`#[cfg]`) to expose the correct implementation
//! for the target OS. Every submodule exposes the same public API, so the rest of the
//! library can use it without worrying about the underlying platform.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use self::linux::*;

#[cfg(not(target_os = "linux"))]
mod unsupported;
#[cfg(not(target_os = "linux"))]
pub use self::unsupported::*;
