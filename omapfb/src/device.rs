// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Framebuffer device access.
//!
//! [`OverlayDevice`] is the seam between the overlay session logic and the
//! kernel: one method per request the session issues. [`FbDevice`] is the
//! implementation backed by a real `/dev/fbN` node.

use std::{
    fs::OpenOptions,
    mem::ManuallyDrop,
    num::NonZeroUsize,
    ops::{Deref, DerefMut},
    os::fd::{AsRawFd, IntoRawFd, OwnedFd},
    path::{Path, PathBuf},
    ptr::NonNull,
};

use nix::{
    errno::Errno,
    sys::mman::{self, MapFlags, ProtFlags},
};
use omapfb_sys::{FbVarScreeninfo, OmapfbMemInfo, OmapfbPlaneInfo, OmapfbUpdateWindow};
use tracing::{trace, warn};

use crate::{Error, Result};

/// Refresh model of the panel behind the display controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Disabled,
    /// The controller scans out framebuffer memory continuously.
    Auto,
    /// The panel only refreshes on an explicit update-window request.
    Manual,
}

impl UpdateMode {
    pub fn from_raw(raw: libc::c_int) -> Option<Self> {
        match raw {
            omapfb_sys::OMAPFB_UPDATE_DISABLED => Some(UpdateMode::Disabled),
            omapfb_sys::OMAPFB_AUTO_UPDATE => Some(UpdateMode::Auto),
            omapfb_sys::OMAPFB_MANUAL_UPDATE => Some(UpdateMode::Manual),
            _ => None,
        }
    }

    pub fn as_raw(self) -> libc::c_int {
        match self {
            UpdateMode::Disabled => omapfb_sys::OMAPFB_UPDATE_DISABLED,
            UpdateMode::Auto => omapfb_sys::OMAPFB_AUTO_UPDATE,
            UpdateMode::Manual => omapfb_sys::OMAPFB_MANUAL_UPDATE,
        }
    }
}

/// Operations the overlay session needs from a framebuffer node.
///
/// Closing happens on drop; implementations log close failures rather than
/// reporting them, since teardown is best effort.
pub trait OverlayDevice: Sized + Send {
    /// Writable mapping of the overlay memory. Unmaps on drop.
    type Mapping: DerefMut<Target = [u8]> + Send;

    /// Opens the node read-write.
    fn open(path: &Path) -> Result<Self>;

    /// `FBIOGET_VSCREENINFO`
    fn var_screen_info(&self) -> Result<FbVarScreeninfo>;

    /// `FBIOPUT_VSCREENINFO`. The driver may adjust `info` in place.
    fn put_var_screen_info(&self, info: &mut FbVarScreeninfo) -> Result<()>;

    /// `OMAPFB_QUERY_PLANE`
    fn query_plane(&self) -> Result<OmapfbPlaneInfo>;

    /// `OMAPFB_SETUP_PLANE`
    fn setup_plane(&self, info: &OmapfbPlaneInfo) -> Result<()>;

    /// `OMAPFB_QUERY_MEM`
    fn query_mem(&self) -> Result<OmapfbMemInfo>;

    /// `OMAPFB_SETUP_MEM`
    fn setup_mem(&self, info: &OmapfbMemInfo) -> Result<()>;

    /// `OMAPFB_SET_UPDATE_MODE`. Returns the mode the driver reports back.
    fn set_update_mode(&self, mode: UpdateMode) -> Result<UpdateMode>;

    /// `OMAPFB_GET_UPDATE_MODE`
    fn update_mode(&self) -> Result<UpdateMode>;

    /// `OMAPFB_UPDATE_WINDOW`
    fn update_window(&self, window: &OmapfbUpdateWindow) -> Result<()>;

    /// Maps `len` bytes of overlay memory at offset 0, shared and writable.
    fn map(&self, len: usize) -> Result<Self::Mapping>;

    /// Unmaps a mapping made by [`Self::map`], reporting failure.
    fn unmap(&self, mapping: Self::Mapping) -> Result<()>;
}

/// A framebuffer node opened read-write.
#[derive(Debug)]
pub struct FbDevice {
    fd: ManuallyDrop<OwnedFd>,
    path: PathBuf,
}

impl FbDevice {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn raw(&self) -> libc::c_int {
        self.fd.as_raw_fd()
    }
}

fn query_err(request: &'static str) -> impl FnOnce(Errno) -> Error {
    move |source| Error::Query { request, source }
}

fn program_err(request: &'static str) -> impl FnOnce(Errno) -> Error {
    move |source| Error::Program { request, source }
}

fn update_mode_from(request: &'static str, raw: libc::c_int) -> Result<UpdateMode> {
    UpdateMode::from_raw(raw).ok_or(Error::Query {
        request,
        source: Errno::ERANGE,
    })
}

impl OverlayDevice for FbDevice {
    type Mapping = FrameMapping;

    fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| Error::DeviceOpen {
                path: path.to_path_buf(),
                source,
            })?;
        trace!("Opened {}", path.display());
        Ok(Self {
            fd: ManuallyDrop::new(OwnedFd::from(file)),
            path: path.to_path_buf(),
        })
    }

    fn var_screen_info(&self) -> Result<FbVarScreeninfo> {
        let mut info = FbVarScreeninfo::default();
        unsafe { omapfb_sys::fbioget_vscreeninfo(self.raw(), &mut info) }
            .map_err(query_err("FBIOGET_VSCREENINFO"))?;
        Ok(info)
    }

    fn put_var_screen_info(&self, info: &mut FbVarScreeninfo) -> Result<()> {
        unsafe { omapfb_sys::fbioput_vscreeninfo(self.raw(), info) }
            .map_err(program_err("FBIOPUT_VSCREENINFO"))?;
        Ok(())
    }

    fn query_plane(&self) -> Result<OmapfbPlaneInfo> {
        let mut info = OmapfbPlaneInfo::default();
        unsafe { omapfb_sys::omapfb_query_plane(self.raw(), &mut info) }
            .map_err(query_err("OMAPFB_QUERY_PLANE"))?;
        Ok(info)
    }

    fn setup_plane(&self, info: &OmapfbPlaneInfo) -> Result<()> {
        unsafe { omapfb_sys::omapfb_setup_plane(self.raw(), info) }
            .map_err(program_err("OMAPFB_SETUP_PLANE"))?;
        Ok(())
    }

    fn query_mem(&self) -> Result<OmapfbMemInfo> {
        let mut info = OmapfbMemInfo::default();
        unsafe { omapfb_sys::omapfb_query_mem(self.raw(), &mut info) }
            .map_err(query_err("OMAPFB_QUERY_MEM"))?;
        Ok(info)
    }

    fn setup_mem(&self, info: &OmapfbMemInfo) -> Result<()> {
        unsafe { omapfb_sys::omapfb_setup_mem(self.raw(), info) }
            .map_err(program_err("OMAPFB_SETUP_MEM"))?;
        Ok(())
    }

    fn set_update_mode(&self, mode: UpdateMode) -> Result<UpdateMode> {
        let mut raw = mode.as_raw();
        unsafe { omapfb_sys::omapfb_set_update_mode(self.raw(), &mut raw) }
            .map_err(program_err("OMAPFB_SET_UPDATE_MODE"))?;
        update_mode_from("OMAPFB_SET_UPDATE_MODE", raw)
    }

    fn update_mode(&self) -> Result<UpdateMode> {
        let mut raw: libc::c_int = 0;
        unsafe { omapfb_sys::omapfb_get_update_mode(self.raw(), &mut raw) }
            .map_err(query_err("OMAPFB_GET_UPDATE_MODE"))?;
        update_mode_from("OMAPFB_GET_UPDATE_MODE", raw)
    }

    fn update_window(&self, window: &OmapfbUpdateWindow) -> Result<()> {
        unsafe { omapfb_sys::omapfb_update_window(self.raw(), window) }
            .map_err(program_err("OMAPFB_UPDATE_WINDOW"))?;
        Ok(())
    }

    fn map(&self, len: usize) -> Result<FrameMapping> {
        let length = NonZeroUsize::new(len).ok_or(Error::Map {
            len,
            source: Errno::EINVAL,
        })?;
        let ptr = unsafe {
            mman::mmap(
                None,
                length,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                &*self.fd,
                0,
            )
        }
        .map_err(|source| Error::Map { len, source })?;
        trace!("Mapped {} bytes of {}", len, self.path.display());
        Ok(FrameMapping {
            ptr: ptr.cast(),
            len,
        })
    }

    fn unmap(&self, mapping: FrameMapping) -> Result<()> {
        mapping.unmap()
    }
}

impl Drop for FbDevice {
    fn drop(&mut self) {
        // Closed by hand so that a failing close(2) is reported.
        let fd = unsafe { ManuallyDrop::take(&mut self.fd) };
        if unsafe { libc::close(fd.into_raw_fd()) } != 0 {
            warn!(
                "Could not close {}: {}",
                self.path.display(),
                std::io::Error::last_os_error()
            );
        }
    }
}

/// Shared mapping of overlay memory, exclusively owned by one session.
#[derive(Debug)]
pub struct FrameMapping {
    ptr: NonNull<u8>,
    len: usize,
}

// Safety: the mapping is exclusively owned; nothing else in the process
// aliases the region, so moving it to another thread is sound.
unsafe impl Send for FrameMapping {}

impl FrameMapping {
    /// Unmaps the region, reporting failure instead of logging it.
    pub fn unmap(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        unsafe { mman::munmap(this.ptr.cast(), this.len) }.map_err(Error::Unmap)
    }
}

impl Deref for FrameMapping {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for FrameMapping {
    fn deref_mut(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for FrameMapping {
    fn drop(&mut self) {
        if let Err(error) = unsafe { mman::munmap(self.ptr.cast(), self.len) } {
            warn!("Could not unmap overlay memory: {}", error);
        }
    }
}
