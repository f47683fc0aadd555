// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

use gst::subclass::prelude::ObjectSubclassExt;
use gstreamer as gst;
use omapfb::{OverlayDevice, RenderRect};
use tracing::trace;

use crate::omapfbsink::{imp::CAT, imp::OmapFbSink, state::Context};

/// Presents one buffer on the overlay.
///
/// A render rectangle written since the previous frame is applied first, so
/// this frame already lands in the re-planned plane.
pub(crate) fn frame<D: OverlayDevice>(
    imp: &OmapFbSink,
    context: &mut Context<D>,
    render_rect: &RenderRect,
    buffer: &gst::Buffer,
) -> Result<gst::FlowSuccess, gst::FlowError> {
    let format = context.format.ok_or(gst::FlowError::NotNegotiated)?;

    if render_rect.take_changed() {
        gst::debug!(
            CAT,
            imp = imp,
            "Render rectangle changed to {:?}, re-planning",
            render_rect.current()
        );
        context.configure(format, render_rect).map_err(|e| {
            gst::error!(CAT, imp = imp, "Failed to re-plan overlay: {}", e);
            gst::FlowError::Error
        })?;
    }

    let session = context.session.as_mut().ok_or(gst::FlowError::Error)?;

    let map = buffer.map_readable().map_err(|_| {
        gst::error!(CAT, imp = imp, "Failed to map buffer readable");
        gst::FlowError::Error
    })?;
    session.write_frame(map.as_slice()).map_err(|e| {
        gst::error!(CAT, imp = imp, "Failed to write frame: {}", e);
        gst::FlowError::Error
    })?;
    drop(map);

    session.post_update(context.display).map_err(|e| {
        gst::error!(CAT, imp = imp, "Failed to post update window: {}", e);
        gst::FlowError::Error
    })?;

    trace!("Rendered buffer {:?}", buffer.pts());
    Ok(gst::FlowSuccess::Ok)
}
