// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Device node resolution.
//!
//! The primary display is `fb0`; overlays are `fb1` and `fb2`. All three live
//! in `/dev` unless `OMAPFB_DEVICE_DIR` points somewhere else.

use std::path::PathBuf;

/// Environment variable overriding the directory holding the `fbN` nodes.
pub const DEVICE_DIR_ENV: &str = "OMAPFB_DEVICE_DIR";

/// Default directory holding the framebuffer nodes.
pub const DEFAULT_DEVICE_DIR: &str = "/dev";

/// Number of overlay nodes the OMAP display controller exposes.
pub const OVERLAY_NODE_COUNT: u8 = 2;

/// Returns the directory the framebuffer nodes are opened from.
pub fn device_dir() -> PathBuf {
    std::env::var_os(DEVICE_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DEVICE_DIR))
}

/// Returns the path of framebuffer node `index` (`fb<index>`).
pub fn fb_node(index: u8) -> PathBuf {
    device_dir().join(format!("fb{index}"))
}

/// Returns the path of the primary display node.
///
/// # Examples
///
/// ```no_run
/// use omapfb::config::primary_node;
///
/// assert_eq!(primary_node(), std::path::PathBuf::from("/dev/fb0"));
/// ```
pub fn primary_node() -> PathBuf {
    fb_node(0)
}

/// Returns the path of overlay node `id` (1 or 2).
pub fn overlay_node(id: u8) -> PathBuf {
    fb_node(id)
}
