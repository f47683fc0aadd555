// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! OMAP Framebuffer Sink Implementation
//!
//! ## Implementation Structure
//! - `OmapFbSink`: render rectangle (lock-free) and the session context
//! - `ObjectImpl`: the four render rectangle properties
//! - `ElementImpl`: metadata and the I420/UYVY sink pad template
//! - `BaseSinkImpl`: start/stop, caps, allocation, render and preroll
//!
//! ## Threading
//! Property writes come from the application thread while the streaming
//! thread renders. The render rectangle is a set of atomics so a property
//! write never waits for a frame copy; everything else sits behind the
//! context mutex.

// Copyright (C) 2018 Sebastian Dröge <sebastian@centricular.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use gst::glib;
use gst::prelude::*;
use gst::subclass::prelude::*;
use gst_base::prelude::BaseSinkExt;
use gst_base::subclass::prelude::*;
use gstreamer as gst;
use gstreamer_base as gst_base;

use omapfb::{DisplayInfo, OverlayPool, OverlaySession, PixelFormat, RectField, RenderRect};
use tracing::trace;

use std::sync::LazyLock;
use std::sync::Mutex;

use crate::omapfbsink;
use crate::omapfbsink::render;
use crate::omapfbsink::state::{Context, input_format_from_caps};

/// Debug category of the element (`GST_DEBUG=omapfbsink:5`).
pub(crate) static CAT: LazyLock<gst::DebugCategory> = LazyLock::new(|| {
    gst::DebugCategory::new(
        "omapfbsink",
        gst::DebugColorFlags::empty(),
        Some("OMAP framebuffer sink"),
    )
});

/// Size limits advertised on the sink pad.
const MIN_SIZE: i32 = 16;
const MAX_SIZE: i32 = 4096;
const MAX_FRAMERATE: i32 = 30;

/// Buffers kept in the pool offered to upstream.
const POOL_MIN_BUFFERS: u32 = 2;

#[derive(Default)]
pub struct OmapFbSink {
    /// Written by property setters without locking.
    render_rect: RenderRect,

    /// Overlay session and negotiated format.
    context: Mutex<Context>,
}

#[glib::object_subclass]
impl ObjectSubclass for OmapFbSink {
    const NAME: &'static str = "GstRsOmapFbSink";
    type Type = omapfbsink::OmapFbSink;
    type ParentType = gst_base::BaseSink;
}

/// Maps a property name onto the rectangle coordinate it controls.
fn rect_field(name: &str) -> Option<RectField> {
    match name {
        "render-x" => Some(RectField::X),
        "render-y" => Some(RectField::Y),
        "render-width" => Some(RectField::Width),
        "render-height" => Some(RectField::Height),
        _ => None,
    }
}

fn rect_property(name: &str, nick: &str, blurb: &str, maximum: u32) -> glib::ParamSpec {
    glib::ParamSpecUInt::builder(name)
        .nick(nick)
        .blurb(blurb)
        .minimum(0)
        .maximum(maximum)
        .default_value(0)
        .mutable_playing()
        .build()
}

impl ObjectImpl for OmapFbSink {
    /// Bounds follow the primary display; unbounded if it could not be probed.
    fn properties() -> &'static [glib::ParamSpec] {
        static PROPERTIES: LazyLock<Vec<glib::ParamSpec>> = LazyLock::new(|| {
            let (max_x, max_y) = DisplayInfo::primary()
                .map_or((u32::MAX, u32::MAX), |display| (display.xres, display.yres));
            vec![
                rect_property(
                    "render-x",
                    "Render X",
                    "Left edge of the area the video is fitted into",
                    max_x,
                ),
                rect_property(
                    "render-y",
                    "Render Y",
                    "Top edge of the area the video is fitted into",
                    max_y,
                ),
                rect_property(
                    "render-width",
                    "Render width",
                    "Width of the area the video is fitted into (0 = full screen)",
                    max_x,
                ),
                rect_property(
                    "render-height",
                    "Render height",
                    "Height of the area the video is fitted into (0 = full screen)",
                    max_y,
                ),
            ]
        });

        PROPERTIES.as_ref()
    }

    fn constructed(&self) {
        #[cfg(feature = "tracing")]
        {
            use tracing_subscriber::filter::LevelFilter;
            use tracing_subscriber::util::SubscriberInitExt;

            let _ = tracing_subscriber::fmt()
                .compact()
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(false)
                .with_max_level(LevelFilter::TRACE)
                .with_ansi(true)
                .finish()
                .try_init();
        }

        self.parent_constructed();

        self.obj().set_sync(true);
    }

    /// Stores one coordinate and clamps the rectangle to the display at once.
    ///
    /// The next rendered buffer picks the change up.
    fn set_property(&self, _id: usize, value: &glib::Value, pspec: &glib::ParamSpec) {
        let Some(field) = rect_field(pspec.name()) else {
            gst::warning!(CAT, imp = self, "Unknown property '{}'", pspec.name());
            return;
        };

        match value.get::<u32>() {
            Ok(requested) => {
                let old = self.render_rect.get(field);
                self.render_rect
                    .set(field, requested, DisplayInfo::primary());
                gst::info!(
                    CAT,
                    imp = self,
                    "Changing {} from {} to {} (stored {})",
                    pspec.name(),
                    old,
                    requested,
                    self.render_rect.get(field)
                );
            }
            Err(e) => {
                gst::error!(CAT, imp = self, "Invalid type for {}: {}", pspec.name(), e);
            }
        }
    }

    fn property(&self, _id: usize, pspec: &glib::ParamSpec) -> glib::Value {
        match rect_field(pspec.name()) {
            Some(field) => self.render_rect.get(field).to_value(),
            None => {
                gst::warning!(CAT, imp = self, "Unknown property {}", pspec.name());
                0u32.to_value()
            }
        }
    }
}

impl GstObjectImpl for OmapFbSink {}

impl ElementImpl for OmapFbSink {
    fn metadata() -> Option<&'static gst::subclass::ElementMetadata> {
        static ELEMENT_METADATA: LazyLock<gst::subclass::ElementMetadata> = LazyLock::new(|| {
            gst::subclass::ElementMetadata::new(
                "Linux OMAP framebuffer sink",
                "Sink/Video",
                "Renders video with omapfb",
                "Contributors to the gst-omapfb project",
            )
        });

        Some(&*ELEMENT_METADATA)
    }

    /// One always-present sink pad taking raw I420 or UYVY video.
    fn pad_templates() -> &'static [gst::PadTemplate] {
        static PAD_TEMPLATES: LazyLock<Result<Vec<gst::PadTemplate>, glib::BoolError>> =
            LazyLock::new(|| {
                let caps = gst::Caps::builder("video/x-raw")
                    .field("format", gst::List::new(PixelFormat::ALL.map(PixelFormat::fourcc)))
                    .field("width", gst::IntRange::new(MIN_SIZE, MAX_SIZE))
                    .field("height", gst::IntRange::new(MIN_SIZE, MAX_SIZE))
                    .field(
                        "framerate",
                        gst::FractionRange::new(
                            gst::Fraction::new(0, 1),
                            gst::Fraction::new(MAX_FRAMERATE, 1),
                        ),
                    )
                    .build();

                let sink_pad_template = gst::PadTemplate::new(
                    "sink",
                    gst::PadDirection::Sink,
                    gst::PadPresence::Always,
                    &caps,
                )?;

                Ok(vec![sink_pad_template])
            });

        match PAD_TEMPLATES.as_ref() {
            Ok(templates) => templates,
            Err(err) => {
                trace!("Failed to create pad templates: {:?}", err);
                &[]
            }
        }
    }
}

impl BaseSinkImpl for OmapFbSink {
    /// READY -> PAUSED: takes an overlay node from the pool and opens it.
    ///
    /// # Returns
    /// * `Ok(())` if the overlay node was opened and queried
    /// * `Err(ErrorMessage)` if the node is missing, busy or not an omapfb node
    fn start(&self) -> Result<(), gst::ErrorMessage> {
        let mut context = self.context.lock().map_err(|e| {
            gst::error_msg!(gst::CoreError::Failed, ["Failed to get context mutex: {}", e])
        })?;

        let display = DisplayInfo::primary();
        match display {
            Some(primary) => {
                gst::info!(CAT, imp = self, "Display is {}x{}", primary.xres, primary.yres)
            }
            None => gst::warning!(CAT, imp = self, "Display size unknown, not clamping"),
        }

        let session = OverlaySession::start(&OverlayPool::global()).map_err(|e| {
            gst::error_msg!(
                gst::ResourceError::OpenReadWrite,
                ["Failed to open overlay: {}", e]
            )
        })?;
        gst::info!(CAT, imp = self, "Started on {}", session.overlay_id());

        context.session = Some(session);
        context.format = None;
        context.display = display;
        Ok(())
    }

    /// PAUSED -> READY: disables the plane, unmaps, closes and returns the
    /// node to the pool. Teardown failures are only logged.
    fn stop(&self) -> Result<(), gst::ErrorMessage> {
        let mut context = self.context.lock().map_err(|e| {
            gst::error_msg!(gst::CoreError::Failed, ["Failed to get context mutex: {}", e])
        })?;

        context.format = None;
        if let Some(session) = context.session.take() {
            session.stop();
        }

        gst::info!(CAT, imp = self, "Stopped");
        Ok(())
    }

    fn render(&self, buffer: &gst::Buffer) -> Result<gst::FlowSuccess, gst::FlowError> {
        let mut context = self.context.lock().map_err(|_| gst::FlowError::Error)?;
        render::frame(self, &mut context, &self.render_rect, buffer)
    }

    /// The first buffer is shown as soon as it arrives.
    fn preroll(&self, buffer: &gst::Buffer) -> Result<gst::FlowSuccess, gst::FlowError> {
        self.render(buffer)
    }

    /// Sizes overlay memory and the plane for `caps`.
    ///
    /// Nothing is reprogrammed when the session already shows these caps.
    ///
    /// # Returns
    /// * `Ok(())` if the overlay is configured for the caps
    /// * `Err(LoggableError)` if the caps are unsupported or a configuration
    ///   step failed
    fn set_caps(&self, caps: &gst::Caps) -> Result<(), gst::LoggableError> {
        let format = input_format_from_caps(caps)?;

        let mut context = self
            .context
            .lock()
            .map_err(|e| gst::loggable_error!(CAT, "Failed to lock context mutex: {}", e))?;

        let reconfigured = context
            .ensure_configured(format, &self.render_rect)
            .map_err(|e| gst::loggable_error!(CAT, "Failed to configure overlay: {}", e))?;
        if !reconfigured {
            gst::debug!(CAT, imp = self, "Already configured for {}", caps);
            return Ok(());
        }

        if let Some(geometry) = context.session.as_ref().and_then(OverlaySession::geometry) {
            gst::info!(
                CAT,
                imp = self,
                "Showing {}x{} {} at {}x{}+{}+{}",
                format.width,
                format.height,
                format.format,
                geometry.out_width,
                geometry.out_height,
                geometry.pos_x,
                geometry.pos_y
            );
        }
        Ok(())
    }

    /// Configures the overlay ahead of the first buffer and offers upstream a
    /// pool of frame-sized buffers.
    ///
    /// If the overlay cannot be configured the query is left to the parent
    /// class; upstream then allocates on its own and render still copies.
    fn propose_allocation(
        &self,
        query: &mut gst::query::Allocation,
    ) -> Result<(), gst::LoggableError> {
        let (caps, need_pool) = query.get_owned();
        let Some(caps) = caps else {
            return self.parent_propose_allocation(query);
        };

        let format = match input_format_from_caps(&caps) {
            Ok(format) => format,
            Err(e) => {
                gst::warning!(CAT, imp = self, "Not proposing allocation: {:?}", e);
                return self.parent_propose_allocation(query);
            }
        };

        let configured = self
            .context
            .lock()
            .map_err(|e| gst::loggable_error!(CAT, "Failed to lock context mutex: {}", e))?
            .ensure_configured(format, &self.render_rect);
        if let Err(e) = configured {
            gst::warning!(CAT, imp = self, "Overlay setup failed, generic buffers: {}", e);
            return self.parent_propose_allocation(query);
        }

        if need_pool {
            let size = u32::try_from(format.input_size())
                .map_err(|e| gst::loggable_error!(CAT, "Frame too large: {}", e))?;
            let pool = gst::BufferPool::new();
            let mut config = pool.config();
            config.set_params(Some(&caps), size, POOL_MIN_BUFFERS, 0);
            pool.set_config(config)
                .map_err(|e| gst::loggable_error!(CAT, "Failed to configure pool: {}", e))?;
            query.add_allocation_pool(Some(&pool), size, POOL_MIN_BUFFERS, 0);
            gst::debug!(CAT, imp = self, "Proposed pool of {} byte buffers", size);
        }

        Ok(())
    }
}
