// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Helpers shared by the overlay tools.

use omapfb::{InputFormat, PixelFormat};

/// Logs to stdout at INFO unless `RUST_LOG` asks for something else.
pub fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

/// BT.601 limited-range (Y, U, V) of the classic 75% colour bars.
const BARS: [(u8, u8, u8); 8] = [
    (180, 128, 128),
    (162, 44, 142),
    (131, 156, 44),
    (112, 72, 58),
    (84, 184, 198),
    (65, 100, 212),
    (35, 212, 114),
    (16, 128, 128),
];

fn bar(width: usize, phase: u32, x: usize) -> (u8, u8, u8) {
    BARS[((x + phase as usize) * BARS.len() / width.max(1)) % BARS.len()]
}

/// Draws UYVY colour bars straight into `surface`, e.g. mapped overlay memory.
pub fn draw_uyvy_bars(format: &InputFormat, phase: u32, surface: &mut [u8]) {
    let width = format.width as usize;
    for row in surface.chunks_exact_mut(format.surface_pitch()) {
        for (pair, quad) in row.chunks_exact_mut(4).enumerate() {
            let (y, u, v) = bar(width, phase, pair * 2);
            quad.copy_from_slice(&[u, y, v, y]);
        }
    }
}

/// Builds one frame of vertical colour bars in `format`, shifted by `phase`
/// pixels so consecutive frames scroll.
pub fn color_bars(format: &InputFormat, phase: u32) -> Vec<u8> {
    let width = format.width as usize;
    let mut frame = vec![0; format.input_size()];

    match format.format {
        PixelFormat::Uyvy => draw_uyvy_bars(format, phase, &mut frame),
        PixelFormat::I420 => {
            let (y_pitch, uv_pitch) = format.i420_pitches();
            let (u_offset, v_offset) = format.i420_offsets();
            let (luma, chroma) = frame.split_at_mut(u_offset);
            let (u_plane, v_plane) = chroma.split_at_mut(v_offset - u_offset);
            for row in luma.chunks_exact_mut(y_pitch) {
                for (x, px) in row.iter_mut().take(width).enumerate() {
                    *px = bar(width, phase, x).0;
                }
            }
            for (u_row, v_row) in u_plane
                .chunks_exact_mut(uv_pitch)
                .zip(v_plane.chunks_exact_mut(uv_pitch))
            {
                for x in 0..width.div_ceil(2) {
                    let (_, u, v) = bar(width, phase, x * 2);
                    u_row[x] = u;
                    v_row[x] = v;
                }
            }
        }
    }
    frame
}
