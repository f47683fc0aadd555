// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! # omapfb-sys: Raw kernel ABI for Linux OMAP framebuffers
//!
//! This crate mirrors the parts of `<linux/fb.h>` and `<linux/omapfb.h>`
//! needed to drive an OMAP overlay plane, and declares the ioctl requests
//! on top of `nix`'s ioctl macros.
//!
//! ## Usage
//!
//! **Most users should NOT use this crate directly.** Use the safe [`omapfb`]
//! wrapper crate instead, which provides:
//! - RAII ownership of device handles and memory mappings
//! - Rust-idiomatic error handling with `Result`
//! - A device trait that can be replaced in tests
//!
//! ## Safety
//!
//! All ioctl functions in this crate are `unsafe`. The caller must pass an
//! open framebuffer file descriptor and a pointer to a properly initialized
//! structure of the declared type.
//!
//! [`omapfb`]: https://docs.rs/omapfb

#![allow(clippy::missing_safety_doc)]

use std::mem::size_of;

use nix::sys::ioctl::ioctl_num_type;
use nix::{ioctl_read_bad, ioctl_readwrite_bad, ioctl_write_ptr_bad, request_code_write};

/// `FBIOGET_VSCREENINFO` from `<linux/fb.h>`.
pub const FBIOGET_VSCREENINFO: ioctl_num_type = 0x4600;

/// `FBIOPUT_VSCREENINFO` from `<linux/fb.h>`.
pub const FBIOPUT_VSCREENINFO: ioctl_num_type = 0x4601;

/// ioctl type character used by every OMAP framebuffer request.
pub const OMAP_IOCTL_TYPE: u8 = b'O';

pub const OMAPFB_SET_UPDATE_MODE: ioctl_num_type =
    request_code_write!(OMAP_IOCTL_TYPE, 40, size_of::<libc::c_int>());
pub const OMAPFB_GET_UPDATE_MODE: ioctl_num_type =
    request_code_write!(OMAP_IOCTL_TYPE, 43, size_of::<libc::c_int>());
pub const OMAPFB_SETUP_PLANE: ioctl_num_type =
    request_code_write!(OMAP_IOCTL_TYPE, 52, size_of::<OmapfbPlaneInfo>());
// The kernel header declares the query requests with _IOW even though the
// driver copies the result back to user space.
pub const OMAPFB_QUERY_PLANE: ioctl_num_type =
    request_code_write!(OMAP_IOCTL_TYPE, 53, size_of::<OmapfbPlaneInfo>());
pub const OMAPFB_UPDATE_WINDOW: ioctl_num_type =
    request_code_write!(OMAP_IOCTL_TYPE, 54, size_of::<OmapfbUpdateWindow>());
pub const OMAPFB_SETUP_MEM: ioctl_num_type =
    request_code_write!(OMAP_IOCTL_TYPE, 55, size_of::<OmapfbMemInfo>());
pub const OMAPFB_QUERY_MEM: ioctl_num_type =
    request_code_write!(OMAP_IOCTL_TYPE, 56, size_of::<OmapfbMemInfo>());

/// `OMAPFB_MEMTYPE_SDRAM`: overlay memory allocated from system RAM.
pub const OMAPFB_MEMTYPE_SDRAM: u8 = 0;
/// `OMAPFB_MEMTYPE_SRAM`: overlay memory allocated from on-chip SRAM.
pub const OMAPFB_MEMTYPE_SRAM: u8 = 1;

/// `OMAPFB_COLOR_YUV422` from `enum omapfb_color_format` (packed UYVY).
pub const OMAPFB_COLOR_YUV422: u32 = 1;

/// Values of `enum omapfb_update_mode`.
pub const OMAPFB_UPDATE_DISABLED: libc::c_int = 0;
pub const OMAPFB_AUTO_UPDATE: libc::c_int = 1;
pub const OMAPFB_MANUAL_UPDATE: libc::c_int = 2;

/// `struct fb_bitfield`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FbBitfield {
    pub offset: u32,
    pub length: u32,
    pub msb_right: u32,
}

/// `struct fb_var_screeninfo`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FbVarScreeninfo {
    pub xres: u32,
    pub yres: u32,
    pub xres_virtual: u32,
    pub yres_virtual: u32,
    pub xoffset: u32,
    pub yoffset: u32,
    pub bits_per_pixel: u32,
    pub grayscale: u32,
    pub red: FbBitfield,
    pub green: FbBitfield,
    pub blue: FbBitfield,
    pub transp: FbBitfield,
    pub nonstd: u32,
    pub activate: u32,
    pub height: u32,
    pub width: u32,
    pub accel_flags: u32,
    pub pixclock: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    pub upper_margin: u32,
    pub lower_margin: u32,
    pub hsync_len: u32,
    pub vsync_len: u32,
    pub sync: u32,
    pub vmode: u32,
    pub rotate: u32,
    pub colorspace: u32,
    pub reserved: [u32; 4],
}

/// `struct omapfb_plane_info`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OmapfbPlaneInfo {
    pub pos_x: u32,
    pub pos_y: u32,
    pub enabled: u8,
    pub channel_out: u8,
    pub mirror: u8,
    pub reserved1: u8,
    pub out_width: u32,
    pub out_height: u32,
    pub reserved2: [u32; 12],
}

/// `struct omapfb_mem_info`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OmapfbMemInfo {
    pub size: u32,
    pub type_: u8,
    pub reserved: [u8; 3],
}

/// `struct omapfb_update_window`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OmapfbUpdateWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub format: u32,
    pub out_x: u32,
    pub out_y: u32,
    pub out_width: u32,
    pub out_height: u32,
    pub reserved: [u32; 8],
}

ioctl_read_bad!(fbioget_vscreeninfo, FBIOGET_VSCREENINFO, FbVarScreeninfo);
ioctl_readwrite_bad!(fbioput_vscreeninfo, FBIOPUT_VSCREENINFO, FbVarScreeninfo);

ioctl_readwrite_bad!(omapfb_query_plane, OMAPFB_QUERY_PLANE, OmapfbPlaneInfo);
ioctl_write_ptr_bad!(omapfb_setup_plane, OMAPFB_SETUP_PLANE, OmapfbPlaneInfo);
ioctl_readwrite_bad!(omapfb_query_mem, OMAPFB_QUERY_MEM, OmapfbMemInfo);
ioctl_write_ptr_bad!(omapfb_setup_mem, OMAPFB_SETUP_MEM, OmapfbMemInfo);
ioctl_readwrite_bad!(omapfb_set_update_mode, OMAPFB_SET_UPDATE_MODE, libc::c_int);
ioctl_readwrite_bad!(omapfb_get_update_mode, OMAPFB_GET_UPDATE_MODE, libc::c_int);
ioctl_write_ptr_bad!(omapfb_update_window, OMAPFB_UPDATE_WINDOW, OmapfbUpdateWindow);
