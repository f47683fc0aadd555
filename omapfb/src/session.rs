// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Overlay session: one overlay node driven by one sink instance.
//!
//! ## Lifecycle
//! 1. [`OverlaySession::start`] takes a node from the pool, opens it and
//!    reads its current screen and plane descriptors.
//! 2. [`OverlaySession::configure`] (re)allocates overlay memory for a frame
//!    format, maps it and programs the plane. It runs again whenever the
//!    format or the render rectangle changes.
//! 3. [`OverlaySession::write_frame`] fills the mapped memory, and
//!    [`OverlaySession::post_update`] refreshes manual-update panels.
//! 4. [`OverlaySession::stop`] (or drop) disables the plane, unmaps the
//!    memory, closes the node and returns it to the pool, in that order.

use std::sync::Arc;

use omapfb_sys::{FbVarScreeninfo, OmapfbMemInfo, OmapfbPlaneInfo, OmapfbUpdateWindow};
use tracing::{debug, error, info, trace, warn};

use crate::{
    DisplayInfo, Error, FbDevice, InputFormat, OverlayDevice, OverlayId, OverlayPool,
    PixelFormat, PlaneGeometry, PoolSlot, Rect, Result, UpdateMode,
    convert::{I420Planes, convert_i420_to_uyvy},
    geometry::plan,
};

/// Resources held for one overlay node.
///
/// Fields drop in declaration order after [`Drop::drop`] ran: the mapping is
/// already gone by then, the device closes next and the pool slot is
/// released last.
pub struct OverlaySession<D: OverlayDevice = FbDevice> {
    framebuffer: Option<D::Mapping>,
    device: D,
    slot: PoolSlot,
    plane_info: OmapfbPlaneInfo,
    mem_info: OmapfbMemInfo,
    overlay_info: FbVarScreeninfo,
    format: Option<InputFormat>,
    geometry: Option<PlaneGeometry>,
    enabled: bool,
    manual_update: bool,
}

impl<D: OverlayDevice> OverlaySession<D> {
    /// Acquires an overlay node from `pool` and opens it.
    ///
    /// The memory stays unmapped and the plane unconfigured until
    /// [`Self::configure`] is called. On failure the node goes back to the pool.
    pub fn start(pool: &Arc<OverlayPool>) -> Result<Self> {
        let slot = pool.acquire();

        let device = D::open(slot.path()).inspect_err(|e| {
            error!("Could not open overlay {}: {}", slot.id(), e);
        })?;
        let overlay_info = device.var_screen_info().inspect_err(|e| {
            error!("Could not get overlay screen info: {}", e);
        })?;
        let plane_info = device.query_plane().inspect_err(|e| {
            error!("Could not query plane info: {}", e);
        })?;

        info!(
            "Started on {} ({}), overlay {}x{}",
            slot.path().display(),
            slot.id(),
            overlay_info.xres,
            overlay_info.yres
        );

        Ok(Self {
            framebuffer: None,
            device,
            slot,
            plane_info,
            mem_info: OmapfbMemInfo::default(),
            overlay_info,
            format: None,
            geometry: None,
            enabled: false,
            manual_update: false,
        })
    }

    /// Allocates and maps overlay memory for `format` and programs the plane
    /// inside `render_rect` (or the whole display).
    ///
    /// Any failure leaves the session disabled until the next successful call.
    pub fn configure(
        &mut self,
        format: &InputFormat,
        display: Option<DisplayInfo>,
        render_rect: Option<Rect>,
    ) -> Result<()> {
        self.enabled = false;
        self.release_mapping();

        // The plane must be off while its memory is reallocated.
        self.plane_info.enabled = 0;
        self.device.setup_plane(&self.plane_info).inspect_err(|e| {
            error!("Could not disable plane: {}", e);
        })?;

        let framesize = format.surface_size();
        self.mem_info.type_ = omapfb_sys::OMAPFB_MEMTYPE_SDRAM;
        self.mem_info.size = framesize as u32;
        if let Err(e) = self.device.setup_mem(&self.mem_info) {
            error!("Could not setup memory of {} bytes: {}", framesize, e);
            self.mem_info.size = 0;
            return Err(e);
        }
        match self.device.query_mem() {
            Ok(reported) if reported.size != self.mem_info.size => debug!(
                "Driver reserved {} bytes for a {} byte frame",
                reported.size, framesize
            ),
            Ok(_) => {}
            Err(e) => debug!("Could not read back memory info: {}", e),
        }

        match self.device.map(framesize) {
            Ok(mapping) => self.framebuffer = Some(mapping),
            Err(e) => {
                error!("Memory map failed: {}", e);
                self.mem_info.size = 0;
                return Err(e);
            }
        }

        self.overlay_info.xres = format.width;
        self.overlay_info.yres = format.height;
        self.overlay_info.xres_virtual = format.width;
        self.overlay_info.yres_virtual = format.height;
        self.overlay_info.xoffset = 0;
        self.overlay_info.yoffset = 0;
        self.overlay_info.nonstd = omapfb_sys::OMAPFB_COLOR_YUV422;
        info!("vscreen info: width={}, height={}", format.width, format.height);
        self.device
            .put_var_screen_info(&mut self.overlay_info)
            .inspect_err(|e| error!("Could not set screen info: {}", e))?;

        let geometry = plan(display, format, render_rect);
        self.plane_info.enabled = 1;
        self.plane_info.pos_x = geometry.pos_x;
        self.plane_info.pos_y = geometry.pos_y;
        self.plane_info.out_width = geometry.out_width;
        self.plane_info.out_height = geometry.out_height;
        info!(
            "plane info: x={}, y={}, width={}, height={}",
            geometry.pos_x, geometry.pos_y, geometry.out_width, geometry.out_height
        );
        self.device
            .setup_plane(&self.plane_info)
            .inspect_err(|e| error!("Could not setup plane: {}", e))?;

        self.manual_update = self.detect_update_mode() == UpdateMode::Manual;
        self.format = Some(*format);
        self.geometry = Some(geometry);
        self.enabled = true;
        Ok(())
    }

    /// Asks for manual updates and trusts whatever the driver reports back.
    fn detect_update_mode(&self) -> UpdateMode {
        match self.device.set_update_mode(UpdateMode::Manual) {
            Ok(mode) => mode,
            Err(set_error) => {
                debug!("Could not set update mode: {}", set_error);
                self.device.update_mode().unwrap_or_else(|e| {
                    warn!("Could not query update mode, assuming auto update: {}", e);
                    UpdateMode::Auto
                })
            }
        }
    }

    /// Copies or converts one frame into overlay memory.
    ///
    /// UYVY frames are copied as-is; I420 frames are interleaved into UYVY.
    /// Callers producing UYVY themselves can skip the copy by drawing into
    /// [`Self::framebuffer_mut`] instead.
    pub fn write_frame(&mut self, data: &[u8]) -> Result<()> {
        if !self.enabled {
            return Err(Error::NotConfigured);
        }
        let format = self.format.ok_or(Error::NotConfigured)?;
        let framebuffer = self.framebuffer.as_deref_mut().ok_or(Error::NotConfigured)?;

        match format.format {
            PixelFormat::Uyvy => {
                let len = data.len().min(framebuffer.len());
                framebuffer[..len].copy_from_slice(&data[..len]);
            }
            PixelFormat::I420 => {
                let (y_pitch, uv_pitch) = format.i420_pitches();
                let planes = I420Planes::split(data, format.height as usize, y_pitch, uv_pitch)
                    .ok_or(Error::BufferTooSmall {
                        expected: format.input_size(),
                        actual: data.len(),
                    })?;
                convert_i420_to_uyvy(
                    (format.width & !15) as usize,
                    (format.height & !15) as usize,
                    &planes,
                    framebuffer,
                    format.surface_pitch(),
                );
            }
        }
        trace!("Wrote {} byte {} frame", data.len(), format.format);
        Ok(())
    }

    /// Requests a full-screen refresh if the panel needs one.
    pub fn post_update(&self, display: Option<DisplayInfo>) -> Result<()> {
        if !self.manual_update {
            return Ok(());
        }

        let (width, height) = match (display, self.geometry) {
            (Some(display), _) => (display.xres, display.yres),
            (None, Some(geometry)) => (
                geometry.pos_x + geometry.out_width,
                geometry.pos_y + geometry.out_height,
            ),
            (None, None) => return Err(Error::NotConfigured),
        };
        let window = OmapfbUpdateWindow {
            width,
            height,
            out_width: width,
            out_height: height,
            ..Default::default()
        };
        self.device.update_window(&window)
    }

    fn release_mapping(&mut self) {
        if let Some(mapping) = self.framebuffer.take() {
            debug!("Unmapping {} bytes", mapping.len());
            if let Err(e) = self.device.unmap(mapping) {
                warn!("Could not unmap overlay memory: {}", e);
            }
        }
    }

    /// Disables the plane and releases everything. Failures are logged.
    pub fn stop(self) {
        info!("Stopping {}", self.slot.id());
        drop(self);
    }

    pub fn overlay_id(&self) -> OverlayId {
        self.slot.id()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn manual_update(&self) -> bool {
        self.manual_update
    }

    pub fn format(&self) -> Option<&InputFormat> {
        self.format.as_ref()
    }

    pub fn geometry(&self) -> Option<PlaneGeometry> {
        self.geometry
    }

    pub fn plane_info(&self) -> &OmapfbPlaneInfo {
        &self.plane_info
    }

    pub fn mem_info(&self) -> &OmapfbMemInfo {
        &self.mem_info
    }

    pub fn overlay_info(&self) -> &FbVarScreeninfo {
        &self.overlay_info
    }

    /// The mapped overlay memory, if configured.
    pub fn framebuffer(&self) -> Option<&[u8]> {
        self.framebuffer.as_deref()
    }

    /// Writable overlay memory for drawing a UYVY frame in place, while the
    /// plane is enabled.
    pub fn framebuffer_mut(&mut self) -> Option<&mut [u8]> {
        if !self.enabled {
            return None;
        }
        self.framebuffer.as_deref_mut()
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

impl<D: OverlayDevice> Drop for OverlaySession<D> {
    fn drop(&mut self) {
        if self.enabled || self.plane_info.enabled != 0 {
            self.plane_info.enabled = 0;
            if let Err(e) = self.device.setup_plane(&self.plane_info) {
                warn!("Could not disable plane: {}", e);
            }
        }
        self.enabled = false;
        self.release_mapping();
        self.mem_info.size = 0;
    }
}
