// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Lock-free render rectangle shared between property setters and the
//! streaming thread.
//!
//! Each coordinate is a word-sized atomic. Writers never block the streaming
//! thread; a composite read may observe a half-applied update, which is fine
//! because every write raises the `changed` flag again and re-planning is
//! idempotent. A writer only stores its own coordinate plus the coordinates
//! clamping actually moves, and the latter only if nobody changed them in
//! between, so concurrent writes to different coordinates never undo each
//! other.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::{DisplayInfo, Rect, geometry::clamp_fields};

/// One coordinate of the render rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectField {
    X,
    Y,
    Width,
    Height,
}

#[derive(Debug, Default)]
pub struct RenderRect {
    x: AtomicU32,
    y: AtomicU32,
    width: AtomicU32,
    height: AtomicU32,
    changed: AtomicBool,
}

impl RenderRect {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, field: RectField) -> &AtomicU32 {
        match field {
            RectField::X => &self.x,
            RectField::Y => &self.y,
            RectField::Width => &self.width,
            RectField::Height => &self.height,
        }
    }

    /// Current (clamped) value of `field`.
    pub fn get(&self, field: RectField) -> u32 {
        self.slot(field).load(Ordering::Relaxed)
    }

    /// Stores `value` into `field` and re-clamps the rectangle to `display`.
    ///
    /// Raises the changed flag when the stored value differs from the old one.
    /// A rectangle whose width or height is zero after clamping is kept but
    /// not used.
    pub fn set(&self, field: RectField, value: u32, display: Option<DisplayInfo>) {
        let old = self.slot(field).swap(value, Ordering::Relaxed);

        loop {
            let raw = self.load();
            let clamped = clamp_fields(display, raw);
            if clamped == raw {
                break;
            }
            self.clamp_towards(raw, clamped);
        }

        if old != value {
            self.changed.store(true, Ordering::Release);
        }
    }

    /// Moves every coordinate that differs between `raw` and `clamped`,
    /// unless another writer stored to it since `raw` was loaded.
    fn clamp_towards(&self, raw: Rect, clamped: Rect) {
        let moves = [
            (&self.x, raw.x, clamped.x),
            (&self.y, raw.y, clamped.y),
            (&self.width, raw.width, clamped.width),
            (&self.height, raw.height, clamped.height),
        ];
        for (slot, from, to) in moves {
            if from != to {
                // A lost race means a newer write, which clamps on its own.
                let _ = slot.compare_exchange(from, to, Ordering::Relaxed, Ordering::Relaxed);
            }
        }
    }

    fn load(&self) -> Rect {
        Rect::new(
            self.x.load(Ordering::Relaxed),
            self.y.load(Ordering::Relaxed),
            self.width.load(Ordering::Relaxed),
            self.height.load(Ordering::Relaxed),
        )
    }

    /// The rectangle to place the video in, if one is set and usable.
    pub fn current(&self) -> Option<Rect> {
        Some(self.load()).filter(|rect| !rect.is_empty())
    }

    /// Returns whether a write happened since the last call, clearing the flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::clamp_render_rect;

    const WVGA: Option<DisplayInfo> = Some(DisplayInfo {
        xres: 800,
        yres: 480,
    });

    fn set_all(rect: &RenderRect, value: Rect, display: Option<DisplayInfo>) {
        rect.set(RectField::X, value.x, display);
        rect.set(RectField::Y, value.y, display);
        rect.set(RectField::Width, value.width, display);
        rect.set(RectField::Height, value.height, display);
    }

    #[test]
    fn unset_rect_is_not_used() {
        let rect = RenderRect::new();
        assert_eq!(rect.current(), None);
        assert!(!rect.take_changed());
    }

    #[test]
    fn writes_are_clamped_immediately() {
        let rect = RenderRect::new();
        set_all(&rect, Rect::new(790, 0, 100, 100), WVGA);

        assert_eq!(rect.get(RectField::X), 784);
        assert_eq!(rect.get(RectField::Width), 16);
        assert_eq!(rect.get(RectField::Height), 100);
        assert_eq!(rect.current(), Some(Rect::new(784, 0, 16, 100)));
    }

    #[test]
    fn changed_flag_is_consumed_once() {
        let rect = RenderRect::new();
        rect.set(RectField::Width, 400, WVGA);
        assert!(rect.take_changed());
        assert!(!rect.take_changed());

        // Rewriting the same value is not a change.
        rect.set(RectField::Width, 400, WVGA);
        assert!(!rect.take_changed());
    }

    #[test]
    fn partial_rect_becomes_usable_once_complete() {
        let rect = RenderRect::new();
        rect.set(RectField::Width, 320, WVGA);
        assert_eq!(rect.current(), None);
        rect.set(RectField::Height, 240, WVGA);
        assert_eq!(rect.current(), Some(Rect::new(0, 0, 320, 240)));
    }

    #[test]
    fn without_display_values_are_kept() {
        let rect = RenderRect::new();
        set_all(&rect, Rect::new(5000, 7000, 10, 10), None);
        assert_eq!(rect.current(), Some(Rect::new(5000, 7000, 10, 10)));
    }

    #[test]
    fn concurrent_writes_to_different_fields_both_land() {
        let mut lost = 0;
        for _ in 0..2000 {
            let rect = RenderRect::new();
            let barrier = std::sync::Barrier::new(2);
            std::thread::scope(|scope| {
                scope.spawn(|| {
                    barrier.wait();
                    rect.set(RectField::X, 10, WVGA);
                });
                scope.spawn(|| {
                    barrier.wait();
                    rect.set(RectField::Width, 400, WVGA);
                });
            });
            if (rect.get(RectField::X), rect.get(RectField::Width)) != (10, 400) {
                lost += 1;
            }
        }
        assert_eq!(lost, 0, "{lost} concurrent write pairs lost a write");
    }

    #[test]
    fn concurrent_writes_keep_the_rect_clamped() {
        let rect = RenderRect::new();
        std::thread::scope(|scope| {
            for (field, seed) in [(RectField::X, 3u32), (RectField::Width, 11), (RectField::Y, 5)] {
                let rect = &rect;
                scope.spawn(move || {
                    let mut state = seed;
                    for _ in 0..5000 {
                        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                        rect.set(field, (state >> 16) % 1200, WVGA);
                    }
                });
            }
        });

        let stored = Rect::new(
            rect.get(RectField::X),
            rect.get(RectField::Y),
            rect.get(RectField::Width),
            rect.get(RectField::Height),
        );
        assert_eq!(clamp_fields(WVGA, stored), stored);
    }

    #[test]
    fn any_write_sequence_leaves_a_clamped_rect() {
        let rect = RenderRect::new();
        let fields = [RectField::X, RectField::Y, RectField::Width, RectField::Height];
        let mut seed = 7u32;
        for _ in 0..2000 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let field = fields[(seed >> 8) as usize % 4];
            let value = (seed >> 16) % 1200;
            rect.set(field, value, WVGA);

            let stored = Rect::new(
                rect.get(RectField::X),
                rect.get(RectField::Y),
                rect.get(RectField::Width),
                rect.get(RectField::Height),
            );
            assert_eq!(clamp_fields(WVGA, stored), stored);
            assert_eq!(rect.current(), clamp_render_rect(WVGA, stored));
        }
    }
}
