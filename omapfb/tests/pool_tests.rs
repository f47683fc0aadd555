// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! Sharing the overlay nodes between sessions.

mod common;

use std::sync::Arc;

use common::FakeDevice;
use omapfb::{Error, OverlayId, OverlayPool, OverlaySession, config};
use tracing_test::traced_test;

#[test]
#[traced_test]
fn third_session_overflows_until_a_node_is_returned() {
    let pool = Arc::new(OverlayPool::new());

    let first = OverlaySession::<FakeDevice>::start(&pool).unwrap();
    let second = OverlaySession::<FakeDevice>::start(&pool).unwrap();
    assert_eq!(first.overlay_id(), OverlayId::Node(1));
    assert_eq!(second.overlay_id(), OverlayId::Node(2));

    // The overflow slot points at fb1, which is already held.
    let third = OverlaySession::<FakeDevice>::start(&pool);
    assert!(logs_contain("overlay nodes are in use"));
    match third {
        Err(Error::DeviceOpen { path, source }) => {
            assert_eq!(path, config::overlay_node(1));
            assert_eq!(source.raw_os_error(), Some(nix::libc::EBUSY));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("overflow session must not open a held node"),
    }
    assert_eq!(pool.overflow_count(), 0);

    first.stop();
    assert!(!pool.is_occupied(1));

    let fourth = OverlaySession::<FakeDevice>::start(&pool).unwrap();
    assert_eq!(fourth.overlay_id(), OverlayId::Node(1));
    assert_eq!(pool.occupied_count(), 2);

    drop(second);
    drop(fourth);
    assert_eq!(pool.occupied_count(), 0);
}

#[test]
fn sessions_on_many_threads_never_share_a_node() {
    let pool = Arc::new(OverlayPool::new());
    let barrier = Arc::new(std::sync::Barrier::new(6));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                // Each thread has its own fake controller, so every open
                // succeeds; only the pool decides who gets which node.
                let session = OverlaySession::<FakeDevice>::start(&pool).unwrap();
                let id = session.overlay_id();
                barrier.wait();
                id
            })
        })
        .collect();

    let ids: Vec<OverlayId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let nodes = |n| ids.iter().filter(|id| **id == OverlayId::Node(n)).count();
    assert_eq!(nodes(1), 1);
    assert_eq!(nodes(2), 1);
    assert_eq!(ids.iter().filter(|id| **id == OverlayId::Overflow).count(), 4);
    assert_eq!(pool.occupied_count(), 0);
    assert_eq!(pool.overflow_count(), 0);
}
