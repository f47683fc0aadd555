// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Shows scrolling colour bars on an overlay plane.
//!
//! ```text
//! cargo run -p omapfb --example ovlprobe -- --width 320 --height 240 --format I420
//! ```

mod common;

use std::time::{Duration, Instant};

use clap::Parser;
use omapfb::{
    DisplayInfo, InputFormat, OverlayPool, OverlaySession, PixelFormat, Ratio, Rect,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(version, about = "Drive an OMAP overlay plane with a test pattern")]
struct Args {
    /// Frame width in pixels.
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value_t = 240)]
    height: u32,

    /// Frame format: I420 or UYVY.
    #[arg(long, default_value = "UYVY")]
    format: PixelFormat,

    /// Pixel aspect ratio as `N:D`.
    #[arg(long, default_value = "1:1", value_parser = parse_ratio)]
    par: Ratio,

    /// Render rectangle as `X,Y,W,H`. The whole display when absent.
    #[arg(long, value_parser = parse_rect)]
    rect: Option<Rect>,

    /// How long to run.
    #[arg(long, default_value_t = 5)]
    seconds: u64,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Draw UYVY frames directly into overlay memory instead of copying them.
    #[arg(long)]
    in_place: bool,
}

fn parse_ratio(s: &str) -> Result<Ratio, String> {
    let (numer, denom) = s.split_once(':').ok_or("expected N:D")?;
    let numer = numer.parse().map_err(|e| format!("{e}"))?;
    let denom = denom.parse().map_err(|e| format!("{e}"))?;
    Ok(Ratio::new(numer, denom))
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let fields = s
        .split(',')
        .map(|field| field.trim().parse::<u32>().map_err(|e| format!("{e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match fields.as_slice() {
        [x, y, width, height] => Ok(Rect::new(*x, *y, *width, *height)),
        _ => Err("expected X,Y,W,H".to_string()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::setup_logging();
    let args = Args::parse();

    let display = DisplayInfo::primary();
    let format = InputFormat::new(args.width, args.height, args.format)
        .with_pixel_aspect_ratio(args.par);

    let mut session: OverlaySession = OverlaySession::start(&OverlayPool::global())?;
    session.configure(&format, display, args.rect)?;
    info!(
        "Overlay {} placed at {:?}, manual update: {}",
        session.overlay_id(),
        session.geometry(),
        session.manual_update()
    );

    let frame_time = Duration::from_secs(1) / args.fps.max(1);
    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    let mut frames = 0u32;
    while Instant::now() < deadline {
        let started = Instant::now();
        let phase = frames * 4;
        let in_place = args.in_place && format.format == PixelFormat::Uyvy;
        if let Some(surface) = session.framebuffer_mut().filter(|_| in_place) {
            common::draw_uyvy_bars(&format, phase, surface);
        } else {
            session.write_frame(&common::color_bars(&format, phase))?;
        }
        session.post_update(display)?;
        frames += 1;
        if let Some(rest) = frame_time.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    info!("Presented {} frames", frames);
    session.stop();
    Ok(())
}
