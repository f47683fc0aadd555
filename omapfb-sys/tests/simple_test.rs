// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Layout checks for the kernel ABI mirrors.

use std::mem::size_of;

/// Structure sizes must match the kernel headers byte for byte, otherwise
/// the encoded ioctl request numbers no longer line up with the driver.
#[test]
fn struct_sizes_match_kernel_abi() {
    assert_eq!(size_of::<omapfb_sys::FbBitfield>(), 12);
    assert_eq!(size_of::<omapfb_sys::FbVarScreeninfo>(), 160);
    assert_eq!(size_of::<omapfb_sys::OmapfbPlaneInfo>(), 68);
    assert_eq!(size_of::<omapfb_sys::OmapfbMemInfo>(), 8);
    assert_eq!(size_of::<omapfb_sys::OmapfbUpdateWindow>(), 68);
}

#[test]
#[cfg(any(
    target_arch = "arm",
    target_arch = "aarch64",
    target_arch = "x86",
    target_arch = "x86_64"
))]
fn omap_request_numbers() {
    // Generic _IOC layout as used on ARM.
    assert_eq!(omapfb_sys::OMAPFB_SETUP_PLANE as u64, 0x4044_4f34);
    assert_eq!(omapfb_sys::OMAPFB_QUERY_PLANE as u64, 0x4044_4f35);
    assert_eq!(omapfb_sys::OMAPFB_UPDATE_WINDOW as u64, 0x4044_4f36);
    assert_eq!(omapfb_sys::OMAPFB_SETUP_MEM as u64, 0x4008_4f37);
    assert_eq!(omapfb_sys::OMAPFB_QUERY_MEM as u64, 0x4008_4f38);
    assert_eq!(omapfb_sys::OMAPFB_SET_UPDATE_MODE as u64, 0x4004_4f28);
    assert_eq!(omapfb_sys::OMAPFB_GET_UPDATE_MODE as u64, 0x4004_4f2b);
}
