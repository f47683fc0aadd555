// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Planar I420 to packed UYVY conversion.

/// Borrowed planes of an I420 frame.
#[derive(Debug, Clone, Copy)]
pub struct I420Planes<'a> {
    pub y: &'a [u8],
    pub u: &'a [u8],
    pub v: &'a [u8],
    /// Row pitch of the Y plane in bytes.
    pub y_pitch: usize,
    /// Row pitch of the U and V planes in bytes.
    pub uv_pitch: usize,
}

impl<'a> I420Planes<'a> {
    /// Splits a contiguous I420 buffer (Y, then U, then V) into its planes.
    ///
    /// An odd `height` is padded to the next even row count, so the Y plane
    /// spans `round_up(height, 2)` rows and each chroma plane half that.
    /// Returns `None` if `data` is too short for that layout.
    pub fn split(data: &'a [u8], height: usize, y_pitch: usize, uv_pitch: usize) -> Option<Self> {
        let rows = height + height % 2;
        let y_len = y_pitch * rows;
        let uv_len = uv_pitch * rows / 2;
        if data.len() < y_len + 2 * uv_len {
            return None;
        }
        let (y, rest) = data.split_at(y_len);
        let (u, rest) = rest.split_at(uv_len);
        let v = &rest[..uv_len];
        Some(Self {
            y,
            u,
            v,
            y_pitch,
            uv_pitch,
        })
    }
}

/// Converts `width` x `height` pixels of `src` into UYVY at `dst`.
///
/// Each pair of pixels becomes `U Y0 V Y1`; every chroma sample is read once
/// and written to the two destination rows it covers. `width` and `height`
/// must already be multiples of 16, and `dst_pitch` at least `width * 2`.
///
/// # Panics
///
/// Panics if a plane or `dst` is shorter than the dimensions imply.
pub fn convert_i420_to_uyvy(
    width: usize,
    height: usize,
    src: &I420Planes<'_>,
    dst: &mut [u8],
    dst_pitch: usize,
) {
    let pairs = width / 2;

    for line in 0..height / 2 {
        let chroma = line * src.uv_pitch;
        let u_row = &src.u[chroma..chroma + pairs];
        let v_row = &src.v[chroma..chroma + pairs];

        let top = 2 * line;
        let y_top = &src.y[top * src.y_pitch..][..width];
        let y_bottom = &src.y[(top + 1) * src.y_pitch..][..width];

        let (dst_top, dst_bottom) = dst[top * dst_pitch..].split_at_mut(dst_pitch);
        let dst_top = &mut dst_top[..pairs * 4];
        let dst_bottom = &mut dst_bottom[..pairs * 4];

        for (i, (&u, &v)) in u_row.iter().zip(v_row).enumerate() {
            let luma = 2 * i;
            dst_top[2 * luma..2 * luma + 4].copy_from_slice(&[u, y_top[luma], v, y_top[luma + 1]]);
            dst_bottom[2 * luma..2 * luma + 4]
                .copy_from_slice(&[u, y_bottom[luma], v, y_bottom[luma + 1]]);
        }
    }
}
