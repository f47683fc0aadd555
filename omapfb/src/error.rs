// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for overlay operations.
//!
//! Every failing step of the overlay lifecycle maps to one variant, so that
//! the log line produced by the caller identifies the step that failed.

use std::path::PathBuf;

use nix::errno::Errno;

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while driving a framebuffer overlay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A framebuffer node could not be opened (missing device, busy overlay).
    #[error("Could not open {}: {source}", path.display())]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A request reading screen, plane, memory or update-mode information failed.
    #[error("Query {request} failed: {source}")]
    Query {
        request: &'static str,
        #[source]
        source: Errno,
    },

    /// A request programming the screen, plane, memory or a window update failed.
    #[error("Programming {request} failed: {source}")]
    Program {
        request: &'static str,
        #[source]
        source: Errno,
    },

    /// Mapping the overlay memory into the process failed.
    #[error("Mapping {len} bytes of overlay memory failed: {source}")]
    Map {
        len: usize,
        #[source]
        source: Errno,
    },

    /// Unmapping the overlay memory failed.
    #[error("Unmapping overlay memory failed: {0}")]
    Unmap(#[source] Errno),

    /// A frame was delivered before the plane was configured for a format.
    #[error("Overlay plane is not configured")]
    NotConfigured,

    /// The fourcc or caps name is not one the overlay can display.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    /// An input frame is shorter than its declared format requires.
    #[error("Buffer too small: expected {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },
}
