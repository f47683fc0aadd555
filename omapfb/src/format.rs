// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Input format descriptor and the byte layout of the overlay surface.

use std::{fmt, str::FromStr};

use crate::Error;

/// Pixel formats accepted on the sink side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Planar 4:2:0, Y then U then V.
    I420,
    /// Packed 4:2:2, `U Y V Y` per pixel pair. Also the overlay surface format.
    Uyvy,
}

impl PixelFormat {
    /// All accepted formats, in order of preference.
    pub const ALL: [PixelFormat; 2] = [PixelFormat::I420, PixelFormat::Uyvy];

    /// The fourcc string as it appears in caps.
    pub fn fourcc(self) -> &'static str {
        match self {
            PixelFormat::I420 => "I420",
            PixelFormat::Uyvy => "UYVY",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fourcc())
    }
}

impl FromStr for PixelFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "I420" => Ok(PixelFormat::I420),
            "UYVY" => Ok(PixelFormat::Uyvy),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A rational number, used for the pixel aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio {
    pub numer: u32,
    pub denom: u32,
}

impl Ratio {
    /// Square pixels.
    pub const ONE: Ratio = Ratio { numer: 1, denom: 1 };

    /// Builds a ratio, falling back to 1:1 for degenerate input.
    pub fn new(numer: u32, denom: u32) -> Self {
        if numer == 0 || denom == 0 {
            Ratio::ONE
        } else {
            Ratio { numer, denom }
        }
    }
}

impl Default for Ratio {
    fn default() -> Self {
        Ratio::ONE
    }
}

/// The negotiated input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputFormat {
    pub width: u32,
    pub height: u32,
    pub pixel_aspect_ratio: Ratio,
    pub format: PixelFormat,
}

impl InputFormat {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            pixel_aspect_ratio: Ratio::ONE,
            format,
        }
    }

    pub fn with_pixel_aspect_ratio(mut self, par: Ratio) -> Self {
        self.pixel_aspect_ratio = par;
        self
    }

    /// Row pitch of the UYVY overlay surface in bytes.
    pub fn surface_pitch(&self) -> usize {
        round_up(self.width as usize, 2) * 2
    }

    /// Size of the UYVY overlay surface in bytes: `round_up(width, 2) * height * 2`.
    pub fn surface_size(&self) -> usize {
        self.surface_pitch() * self.height as usize
    }

    /// Row pitches of the Y and U/V planes of an I420 frame of this width.
    ///
    /// Chroma covers `round_up(width, 2) / 2` samples per row, so odd widths
    /// get the extra sample; both pitches are padded to 4 bytes.
    pub fn i420_pitches(&self) -> (usize, usize) {
        let width = self.width as usize;
        (round_up(width, 4), round_up(round_up(width, 2) / 2, 4))
    }

    /// Byte offsets of the U and V planes in an I420 frame.
    ///
    /// The Y plane always spans an even number of rows.
    pub fn i420_offsets(&self) -> (usize, usize) {
        let (y_pitch, uv_pitch) = self.i420_pitches();
        let rows = round_up(self.height as usize, 2);
        let u_offset = y_pitch * rows;
        (u_offset, u_offset + uv_pitch * rows / 2)
    }

    /// `(offset, pitch)` of each plane of an input frame, in plane order.
    pub fn plane_layout(&self) -> Vec<(usize, usize)> {
        match self.format {
            PixelFormat::Uyvy => vec![(0, self.surface_pitch())],
            PixelFormat::I420 => {
                let (y_pitch, uv_pitch) = self.i420_pitches();
                let (u_offset, v_offset) = self.i420_offsets();
                vec![(0, y_pitch), (u_offset, uv_pitch), (v_offset, uv_pitch)]
            }
        }
    }

    /// Minimum number of bytes an input buffer must carry.
    pub fn input_size(&self) -> usize {
        match self.format {
            PixelFormat::Uyvy => self.surface_size(),
            PixelFormat::I420 => {
                let (_, uv_pitch) = self.i420_pitches();
                let (_, v_offset) = self.i420_offsets();
                v_offset + uv_pitch * round_up(self.height as usize, 2) / 2
            }
        }
    }
}

/// Rounds `value` up to the next multiple of `align` (a power of two).
pub(crate) fn round_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}
