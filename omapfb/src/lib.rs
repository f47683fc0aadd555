// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! # omapfb - OMAP framebuffer overlays
//!
//! Safe, idiomatic Rust access to the overlay planes of the OMAP display
//! controller, as exposed by the Linux `omapfb` driver. The raw kernel ABI
//! lives in [`omapfb_sys`]; this crate adds RAII ownership, error handling
//! and the policy a video sink needs on top.
//!
//! ## Key Concepts
//!
//! - **Primary display** (`/dev/fb0`): only probed for its resolution ([`DisplayInfo`])
//! - **Overlay node** (`/dev/fb1`, `/dev/fb2`): a hardware plane with its own memory,
//!   YUV format conversion and scaler, shared process-wide through [`OverlayPool`]
//! - **Session**: one opened overlay node with its mapped memory ([`OverlaySession`])
//! - **Render rectangle**: the screen area the video is fitted into ([`RenderRect`])
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  acquire   ┌────────────────┐  plan   ┌──────────┐
//! │ OverlayPool │ ─────────► │ OverlaySession │ ◄────── │ geometry │
//! └─────────────┘            └───────┬────────┘         └──────────┘
//!                                    │ write_frame
//!                                    ├─► memcpy (UYVY)
//!                                    └─► convert_i420_to_uyvy (I420)
//! ```
//!
//! ## Examples
//!
//! ```no_run
//! use omapfb::{DisplayInfo, InputFormat, OverlayPool, OverlaySession, PixelFormat};
//!
//! # fn main() -> Result<(), omapfb::Error> {
//! let display = DisplayInfo::primary();
//! let mut session: OverlaySession = OverlaySession::start(&OverlayPool::global())?;
//!
//! let format = InputFormat::new(320, 240, PixelFormat::Uyvy);
//! session.configure(&format, display, None)?;
//!
//! let frame = vec![0x80u8; format.surface_size()];
//! session.write_frame(&frame)?;
//! session.post_update(display)?;
//!
//! session.stop();
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! - [`OverlayPool`] and [`RenderRect`] are `Sync` and meant to be shared
//! - [`OverlaySession`] is `Send`; callers serialize access to it

mod device;
mod error;
mod format;
mod pool;
mod render_rect;
mod session;

pub mod config;
pub mod convert;
pub mod display;
pub mod geometry;

pub use device::{FbDevice, FrameMapping, OverlayDevice, UpdateMode};
pub use display::DisplayInfo;
pub use error::{Error, Result};
pub use format::{InputFormat, PixelFormat, Ratio};
pub use geometry::{PlaneGeometry, Rect};
pub use pool::{OverlayId, OverlayPool, PoolSlot};
pub use render_rect::{RectField, RenderRect};
pub use session::OverlaySession;

pub use omapfb_sys::{FbVarScreeninfo, OmapfbMemInfo, OmapfbPlaneInfo, OmapfbUpdateWindow};
