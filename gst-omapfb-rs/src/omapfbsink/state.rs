// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Runtime state of omapfbsink and the translation from caps to the overlay
//! input format.
//!
//! ## Configuration Flow
//! 1. `start()` opens an overlay session (no memory yet)
//! 2. `set_caps()` or `propose_allocation()` parse caps with
//!    [`input_format_from_caps`] and call [`Context::configure`]
//! 3. `render()` re-runs [`Context::configure`] when the render rectangle
//!    changed since the last plan

use gst::CapsRef;
use gstreamer as gst;
use gstreamer_video as gst_video;
use omapfb::{
    DisplayInfo, FbDevice, InputFormat, OverlayDevice, OverlaySession, PixelFormat, Ratio,
    RenderRect,
};
use tracing::debug;

use crate::omapfbsink::imp::CAT;

/// Mutable state of the element, guarded by one mutex.
///
/// `session` is `Some` between `start()` and `stop()`; `format` is the last
/// caps the session was configured for. `display` is the primary display as
/// seen at `start()`.
pub(crate) struct Context<D: OverlayDevice = FbDevice> {
    pub session: Option<OverlaySession<D>>,
    pub format: Option<InputFormat>,
    pub display: Option<DisplayInfo>,
}

impl<D: OverlayDevice> Default for Context<D> {
    fn default() -> Self {
        Self {
            session: None,
            format: None,
            display: None,
        }
    }
}

impl<D: OverlayDevice> Context<D> {
    /// Whether the session currently shows `format`.
    pub fn is_configured_for(&self, format: &InputFormat) -> bool {
        self.format.as_ref() == Some(format)
            && self.session.as_ref().is_some_and(OverlaySession::is_enabled)
    }

    /// (Re)configures the overlay for `format` inside the current render
    /// rectangle, consuming its changed flag.
    ///
    /// # Returns
    /// * `Ok(())` if the plane is programmed and memory mapped
    /// * `Err(omapfb::Error)` if no session is open or a configuration step
    ///   failed; the session then stays disabled
    pub fn configure(
        &mut self,
        format: InputFormat,
        render_rect: &RenderRect,
    ) -> omapfb::Result<()> {
        let session = self
            .session
            .as_mut()
            .ok_or(omapfb::Error::NotConfigured)?;

        render_rect.take_changed();
        self.format = Some(format);
        session.configure(&format, self.display, render_rect.current())
    }

    /// Configures for `format` unless the session already shows it.
    ///
    /// # Returns
    /// * `Ok(true)` if the overlay was (re)programmed
    /// * `Ok(false)` if nothing had to change
    pub fn ensure_configured(
        &mut self,
        format: InputFormat,
        render_rect: &RenderRect,
    ) -> omapfb::Result<bool> {
        if self.is_configured_for(&format) {
            return Ok(false);
        }
        self.configure(format, render_rect).map(|()| true)
    }
}

/// Extracts the overlay input format from negotiated `video/x-raw` caps.
///
/// # Arguments
/// * `caps` - Fixed caps with format, width, height and optionally
///   pixel-aspect-ratio (1:1 when absent)
///
/// # Returns
/// * `Ok(InputFormat)` for I420 or UYVY caps
/// * `Err(LoggableError)` if the caps are not fixed video caps or carry
///   another format
pub(crate) fn input_format_from_caps(caps: &CapsRef) -> Result<InputFormat, gst::LoggableError> {
    let info = gst_video::VideoInfo::from_caps(caps)
        .map_err(|e| gst::loggable_error!(CAT, "Invalid video caps {}: {}", caps, e))?;

    let format = info
        .format()
        .to_str()
        .as_str()
        .parse::<PixelFormat>()
        .map_err(|e| gst::loggable_error!(CAT, "{}", e))?;

    let par = info.par();
    let pixel_aspect_ratio = Ratio::new(
        u32::try_from(par.numer()).unwrap_or(0),
        u32::try_from(par.denom()).unwrap_or(0),
    );

    let input = InputFormat::new(info.width(), info.height(), format)
        .with_pixel_aspect_ratio(pixel_aspect_ratio);

    // Frames are sliced with our own plane arithmetic; it has to agree with
    // the layout upstream fills.
    let layout: Vec<(usize, usize)> = info
        .offset()
        .iter()
        .zip(info.stride())
        .map(|(&offset, &stride)| (offset, usize::try_from(stride).unwrap_or(0)))
        .collect();
    if layout != input.plane_layout() || info.size() != input.input_size() {
        return Err(gst::loggable_error!(
            CAT,
            "Unexpected {} layout {:?} ({} bytes), expected {:?} ({} bytes)",
            format,
            layout,
            info.size(),
            input.plane_layout(),
            input.input_size()
        ));
    }

    debug!(
        "Negotiated {} {}x{}, par {}:{}, {} bytes per frame",
        format,
        input.width,
        input.height,
        pixel_aspect_ratio.numer,
        pixel_aspect_ratio.denom,
        input.input_size()
    );
    Ok(input)
}
