// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! OMAP Framebuffer Sink Element
//!
//! `omapfbsink` takes raw I420 or UYVY frames and shows them on an overlay
//! plane of the OMAP display controller.
//!
//! ## Responsibilities
//! - Takes an overlay node from the process-wide pool on READY -> PAUSED
//!   and returns it on PAUSED -> READY
//! - Sizes the overlay memory and the plane for the negotiated caps
//! - Copies (UYVY) or converts (I420) each buffer into overlay memory
//! - Requests a refresh on panels that only update on demand
//!
//! ## Properties (writable in any state)
//! - `render-x`, `render-y`, `render-width`, `render-height`: screen area the
//!   video is fitted into. Full screen while width or height is 0.
//!
//! ## Example Pipeline
//! ```bash
//! gst-launch-1.0 videotestsrc ! video/x-raw,format=UYVY ! omapfbsink
//! ```

use gst::glib;
use gst::prelude::*;
use gstreamer as gst;
use gstreamer_base as gst_base;

/// Element implementation (properties, caps, BaseSink hooks)
mod imp;

/// Buffer rendering (re-plan on rect change, copy, refresh)
mod render;


/// Negotiated state and caps parsing
mod state;

glib::wrapper! {
    pub struct OmapFbSink(ObjectSubclass<imp::OmapFbSink>) @extends gst_base::BaseSink, gst::Element, gst::Object;
}

/// Registers the omapfbsink element with GStreamer.
///
/// # Arguments
/// * `plugin` - The parent plugin instance
///
/// # Rank
/// NONE: the element is never picked by autoplugging and must be requested
/// by name.
pub fn register(plugin: &gst::Plugin) -> Result<(), glib::BoolError> {
    gst::Element::register(
        Some(plugin),
        "omapfbsink",
        gst::Rank::NONE,
        OmapFbSink::static_type(),
    )
}
