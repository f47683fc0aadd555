// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Placement of the video on screen.
//!
//! The overlay scaler needs even output dimensions and behaves best when the
//! target area is 16-pixel aligned. The planner therefore:
//!
//! 1. clamps the caller's render rectangle to the display,
//! 2. shrinks it to a multiple of 16 on each axis, centred in the original,
//! 3. fits the frame inside, preserving its display aspect ratio,
//! 4. rounds the output size up to even and centres it.

use tracing::debug;

use crate::{DisplayInfo, InputFormat};

/// Smallest render area the planner keeps after clamping, and the alignment
/// the area is shrunk to.
pub const RENDER_ALIGN: u32 = 16;

/// A rectangle in display pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Position and output size programmed into the overlay plane.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaneGeometry {
    pub pos_x: u32,
    pub pos_y: u32,
    pub out_width: u32,
    pub out_height: u32,
}

/// Applies the display bounds to every field of `rect`.
///
/// The origin is kept at least 16 pixels inside the display, and the size is
/// shrunk so the rectangle ends at the display edge. Without a display the
/// rectangle is returned unchanged.
pub fn clamp_fields(display: Option<DisplayInfo>, rect: Rect) -> Rect {
    let Some(display) = display else {
        return rect;
    };

    let mut out = rect;
    out.x = out.x.min(display.xres.saturating_sub(RENDER_ALIGN));
    out.y = out.y.min(display.yres.saturating_sub(RENDER_ALIGN));
    if u64::from(out.x) + u64::from(out.width) > u64::from(display.xres) {
        out.width = display.xres - out.x;
    }
    if u64::from(out.y) + u64::from(out.height) > u64::from(display.yres) {
        out.height = display.yres - out.y;
    }
    out
}

/// Clamps `rect` to the display; `None` if nothing of it remains.
pub fn clamp_render_rect(display: Option<DisplayInfo>, rect: Rect) -> Option<Rect> {
    let clamped = clamp_fields(display, rect);
    (!clamped.is_empty()).then_some(clamped)
}

/// Shrinks `rect` to a multiple of 16 on both axes, centred in the original.
pub fn align_render_rect(rect: Rect) -> Rect {
    let width = rect.width & !(RENDER_ALIGN - 1);
    let height = rect.height & !(RENDER_ALIGN - 1);
    Rect {
        x: rect.x + (rect.width - width) / 2,
        y: rect.y + (rect.height - height) / 2,
        width,
        height,
    }
}

/// The area the video is fitted into.
///
/// A usable render rectangle wins; otherwise the whole display. Without a
/// display, the frame's own size (rounded down to even) at the origin.
pub fn effective_rect(
    display: Option<DisplayInfo>,
    format: &InputFormat,
    render_rect: Option<Rect>,
) -> Rect {
    let requested = render_rect
        .and_then(|rect| clamp_render_rect(display, rect))
        .map(align_render_rect)
        .filter(|rect| !rect.is_empty());

    match (requested, display) {
        (Some(rect), _) => rect,
        (None, Some(display)) => Rect::new(0, 0, display.xres, display.yres),
        (None, None) => Rect::new(0, 0, format.width & !1, format.height & !1),
    }
}

/// Computes the plane geometry for `format` on `display`.
pub fn plan(
    display: Option<DisplayInfo>,
    format: &InputFormat,
    render_rect: Option<Rect>,
) -> PlaneGeometry {
    let area = effective_rect(display, format, render_rect);

    // Display aspect ratio of the frame: (W * par_n) : (H * par_d).
    let par = format.pixel_aspect_ratio;
    let dar_w = (u64::from(format.width) * u64::from(par.numer)).max(1);
    let dar_h = (u64::from(format.height) * u64::from(par.denom)).max(1);
    let (rw, rh) = (u64::from(area.width), u64::from(area.height));

    let mut out_width = rw;
    let mut out_height = (dar_h * rw + dar_w / 2) / dar_w;
    if out_height > rh {
        out_height = rh;
        out_width = (dar_w * rh + dar_h / 2) / dar_h;
    }

    let out_width = round_up_even(out_width).min(rw & !1) as u32;
    let out_height = round_up_even(out_height).min(rh & !1) as u32;

    let geometry = PlaneGeometry {
        pos_x: area.x + (area.width - out_width) / 2,
        pos_y: area.y + (area.height - out_height) / 2,
        out_width,
        out_height,
    };
    debug!(
        "Planned {}x{} at ({}, {}) inside {:?} for a {}x{} frame",
        geometry.out_width,
        geometry.out_height,
        geometry.pos_x,
        geometry.pos_y,
        area,
        format.width,
        format.height
    );
    geometry
}

fn round_up_even(value: u64) -> u64 {
    (value + 1) & !1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PixelFormat, Ratio};

    const WVGA: Option<DisplayInfo> = Some(DisplayInfo {
        xres: 800,
        yres: 480,
    });

    #[test]
    fn four_by_three_is_pillarboxed() {
        let format = InputFormat::new(320, 240, PixelFormat::Uyvy);
        assert_eq!(
            plan(WVGA, &format, None),
            PlaneGeometry {
                pos_x: 80,
                pos_y: 0,
                out_width: 640,
                out_height: 480,
            }
        );
    }

    #[test]
    fn sixteen_by_nine_is_letterboxed() {
        let format = InputFormat::new(640, 360, PixelFormat::I420);
        assert_eq!(
            plan(WVGA, &format, None),
            PlaneGeometry {
                pos_x: 0,
                pos_y: 15,
                out_width: 800,
                out_height: 450,
            }
        );
    }

    #[test]
    fn pixel_aspect_ratio_widens_the_picture() {
        // 720x576 at 16:15 displays as 768x576, i.e. 4:3.
        let format = InputFormat::new(720, 576, PixelFormat::I420)
            .with_pixel_aspect_ratio(Ratio::new(16, 15));
        let geometry = plan(WVGA, &format, None);
        assert_eq!((geometry.out_width, geometry.out_height), (640, 480));
        assert_eq!((geometry.pos_x, geometry.pos_y), (80, 0));
    }

    #[test]
    fn render_rect_is_clamped_to_display() {
        let clamped = clamp_render_rect(WVGA, Rect::new(790, 0, 100, 100)).unwrap();
        assert_eq!(clamped, Rect::new(784, 0, 16, 100));

        let aligned = align_render_rect(clamped);
        assert_eq!(aligned, Rect::new(784, 2, 16, 96));
    }

    #[test]
    fn empty_render_rect_is_discarded() {
        assert_eq!(clamp_render_rect(WVGA, Rect::new(10, 10, 0, 100)), None);
        assert_eq!(clamp_render_rect(WVGA, Rect::new(10, 500, 100, 0)), None);

        let format = InputFormat::new(320, 240, PixelFormat::Uyvy);
        assert_eq!(
            effective_rect(WVGA, &format, Some(Rect::new(0, 0, 0, 0))),
            Rect::new(0, 0, 800, 480)
        );
    }

    #[test]
    fn render_rect_narrower_than_alignment_falls_back_to_full_screen() {
        let format = InputFormat::new(320, 240, PixelFormat::Uyvy);
        assert_eq!(
            effective_rect(WVGA, &format, Some(Rect::new(100, 100, 10, 200))),
            Rect::new(0, 0, 800, 480)
        );
    }

    #[test]
    fn video_is_centred_in_render_rect() {
        let format = InputFormat::new(640, 360, PixelFormat::I420);
        let geometry = plan(WVGA, &format, Some(Rect::new(100, 50, 400, 300)));
        // 400x300 is already aligned on x (400) but not on y (300 -> 288).
        assert_eq!(geometry.out_width, 400);
        assert_eq!(geometry.out_height, 226);
        assert_eq!(geometry.pos_x, 100);
        assert_eq!(geometry.pos_y, 56 + (288 - 226) / 2);
    }

    #[test]
    fn unknown_display_keeps_native_size() {
        let format = InputFormat::new(321, 240, PixelFormat::Uyvy);
        let geometry = plan(None, &format, None);
        assert_eq!((geometry.pos_x, geometry.pos_y), (0, 0));
        assert_eq!(geometry.out_width % 2, 0);
        assert!(geometry.out_width <= 320);
        assert_eq!(geometry.out_height, 240);
    }

    #[test]
    fn output_is_even_and_inside_area_for_many_shapes() {
        let displays = [WVGA, Some(DisplayInfo::new(864, 480)), Some(DisplayInfo::new(1024, 600))];
        for display in displays {
            for width in (16..=1920).step_by(52) {
                for height in (16..=1080).step_by(38) {
                    let format = InputFormat::new(width, height, PixelFormat::I420);
                    for rect in [None, Some(Rect::new(33, 17, 301, 199))] {
                        let area = effective_rect(display, &format, rect);
                        let geometry = plan(display, &format, rect);
                        assert_eq!(geometry.out_width % 2, 0);
                        assert_eq!(geometry.out_height % 2, 0);
                        assert!(geometry.pos_x >= area.x);
                        assert!(geometry.pos_y >= area.y);
                        assert!(geometry.pos_x + geometry.out_width <= area.x + area.width);
                        assert!(geometry.pos_y + geometry.out_height <= area.y + area.height);
                    }
                }
            }
        }
    }
}
