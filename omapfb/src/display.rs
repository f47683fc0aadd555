// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Primary display geometry.
//!
//! The resolution of the primary framebuffer is read once per process and
//! cached. A failed probe is cached too: the display is then treated as
//! unbounded and every bounds check against it becomes a no-op.

use std::{path::Path, sync::OnceLock};

use tracing::{info, warn};

use crate::{FbDevice, OverlayDevice, Result, config};

static PRIMARY: OnceLock<Option<DisplayInfo>> = OnceLock::new();

/// Visible resolution of the primary display, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayInfo {
    pub xres: u32,
    pub yres: u32,
}

impl DisplayInfo {
    pub fn new(xres: u32, yres: u32) -> Self {
        Self { xres, yres }
    }

    /// Probes the primary display once and returns the cached result.
    ///
    /// `None` means the probe failed and the resolution is unbounded.
    pub fn primary() -> Option<DisplayInfo> {
        *PRIMARY.get_or_init(|| {
            let path = config::primary_node();
            match probe::<FbDevice>(&path) {
                Ok(primary) => {
                    info!(
                        "Primary display {}: {}x{}",
                        path.display(),
                        primary.xres,
                        primary.yres
                    );
                    Some(primary)
                }
                Err(error) => {
                    warn!(
                        "Could not probe primary display, geometry is unbounded: {}",
                        error
                    );
                    None
                }
            }
        })
    }
}

/// Opens `path`, reads its virtual screen info and closes it again.
pub fn probe<D: OverlayDevice>(path: &Path) -> Result<DisplayInfo> {
    let device = D::open(path)?;
    let var = device.var_screen_info()?;
    Ok(DisplayInfo::new(var.xres, var.yres))
}
