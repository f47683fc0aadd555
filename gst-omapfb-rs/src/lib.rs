// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! GStreamer plugin for OMAP framebuffer overlays
//!
//! Provides a single element, **omapfbsink**, that presents raw video on one
//! of the hardware overlay planes of the OMAP display controller (`/dev/fb1`
//! or `/dev/fb2`). The plane's own scaler fits the video into the display or
//! into a render rectangle set through properties, so no CPU scaling is done.
//!
//! ## Supported Media Formats
//! - **I420**: planar 4:2:0, converted to UYVY while copying
//! - **UYVY**: packed 4:2:2, copied as-is
//!
//! ## Example Pipeline
//! ```bash
//! gst-launch-1.0 videotestsrc ! video/x-raw,format=I420,width=320,height=240 ! \
//!     omapfbsink render-x=100 render-y=50 render-width=400 render-height=300
//! ```

// Copyright (C) 2017 Sebastian Dröge <sebastian@centricular.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::non_send_fields_in_send_ty, unused_doc_comments)]

use gst::glib;
use gstreamer as gst;

/// Overlay sink element
mod omapfbsink;

/// Registers the elements of this plugin.
///
/// # Arguments
/// * `plugin` - The GStreamer plugin instance being initialized
///
/// # Returns
/// * `Ok(())` if the element registered successfully
/// * `Err(BoolError)` if registration failed
fn plugin_init(plugin: &gst::Plugin) -> Result<(), glib::BoolError> {
    omapfbsink::register(plugin)
}

gst::plugin_define!(
    omapfb,
    env!("CARGO_PKG_DESCRIPTION"),
    plugin_init,
    concat!(env!("CARGO_PKG_VERSION"), "-", env!("COMMIT_ID")),
    "Apache-2.0",
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_REPOSITORY"),
    env!("BUILD_REL_DATE")
);
