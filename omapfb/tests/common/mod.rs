// SPDX-FileCopyrightText: 2025 Contributors to the gst-omapfb project.
// SPDX-License-Identifier: Apache-2.0

//! In-memory stand-in for an omapfb node, shared by the integration tests.
//!
//! The fake "kernel" state is thread-local, so every test (each runs on its
//! own thread) sees a fresh display controller.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
};

use nix::errno::Errno;
use omapfb::{
    Error, FbVarScreeninfo, OmapfbMemInfo, OmapfbPlaneInfo, OmapfbUpdateWindow, OverlayDevice,
    Result, UpdateMode,
};

/// Requests as the fake driver saw them, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open(PathBuf),
    PutVar(FbVarScreeninfo),
    SetupPlane(OmapfbPlaneInfo),
    SetupMem(OmapfbMemInfo),
    Map(usize),
    Unmap(usize),
    SetUpdateMode(UpdateMode),
    UpdateWindow(OmapfbUpdateWindow),
    Close(PathBuf),
}

thread_local! {
    static OPEN_NODES: RefCell<HashSet<PathBuf>> = RefCell::new(HashSet::new());
    static FAILING: RefCell<HashSet<&'static str>> = RefCell::new(HashSet::new());
    static JOURNAL: RefCell<Vec<Call>> = const { RefCell::new(Vec::new()) };
    static PANEL_MODE: Cell<UpdateMode> = const { Cell::new(UpdateMode::Auto) };
    static SCREEN: Cell<(u32, u32)> = const { Cell::new((800, 480)) };
}

/// Makes every later `request` (e.g. `"OMAPFB_SETUP_MEM"`, `"open"`) fail.
pub fn fail(request: &'static str) {
    FAILING.with(|failing| failing.borrow_mut().insert(request));
}

/// Sets the refresh model the fake panel reports.
pub fn set_panel_mode(mode: UpdateMode) {
    PANEL_MODE.with(|panel| panel.set(mode));
}

/// Sets the resolution reported by `FBIOGET_VSCREENINFO`.
pub fn set_screen(xres: u32, yres: u32) {
    SCREEN.with(|screen| screen.set((xres, yres)));
}

/// Returns and clears the journal of requests.
pub fn take_journal() -> Vec<Call> {
    JOURNAL.with(|journal| journal.take())
}

fn record(call: Call) {
    JOURNAL.with(|journal| journal.borrow_mut().push(call));
}

fn check(request: &'static str) -> Result<()> {
    if FAILING.with(|failing| failing.borrow().contains(request)) {
        Err(Error::Program {
            request,
            source: Errno::EIO,
        })
    } else {
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakeDevice {
    path: PathBuf,
    var: Cell<FbVarScreeninfo>,
    plane: Cell<OmapfbPlaneInfo>,
    mem: Cell<OmapfbMemInfo>,
}

impl FakeDevice {
    pub fn plane(&self) -> OmapfbPlaneInfo {
        self.plane.get()
    }
}

impl OverlayDevice for FakeDevice {
    type Mapping = FakeMapping;

    fn open(path: &Path) -> Result<Self> {
        check("open").map_err(|_| Error::DeviceOpen {
            path: path.to_path_buf(),
            source: std::io::Error::from(Errno::ENOENT),
        })?;
        let newly_opened = OPEN_NODES.with(|nodes| nodes.borrow_mut().insert(path.to_path_buf()));
        if !newly_opened {
            return Err(Error::DeviceOpen {
                path: path.to_path_buf(),
                source: std::io::Error::from(Errno::EBUSY),
            });
        }
        record(Call::Open(path.to_path_buf()));

        let (xres, yres) = SCREEN.with(Cell::get);
        let var = FbVarScreeninfo {
            xres,
            yres,
            xres_virtual: xres,
            yres_virtual: yres,
            bits_per_pixel: 16,
            ..Default::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            var: Cell::new(var),
            plane: Cell::new(OmapfbPlaneInfo::default()),
            mem: Cell::new(OmapfbMemInfo::default()),
        })
    }

    fn var_screen_info(&self) -> Result<FbVarScreeninfo> {
        check("FBIOGET_VSCREENINFO")?;
        Ok(self.var.get())
    }

    fn put_var_screen_info(&self, info: &mut FbVarScreeninfo) -> Result<()> {
        check("FBIOPUT_VSCREENINFO")?;
        record(Call::PutVar(*info));
        self.var.set(*info);
        Ok(())
    }

    fn query_plane(&self) -> Result<OmapfbPlaneInfo> {
        check("OMAPFB_QUERY_PLANE")?;
        Ok(self.plane.get())
    }

    fn setup_plane(&self, info: &OmapfbPlaneInfo) -> Result<()> {
        check("OMAPFB_SETUP_PLANE")?;
        record(Call::SetupPlane(*info));
        self.plane.set(*info);
        Ok(())
    }

    fn query_mem(&self) -> Result<OmapfbMemInfo> {
        check("OMAPFB_QUERY_MEM")?;
        Ok(self.mem.get())
    }

    fn setup_mem(&self, info: &OmapfbMemInfo) -> Result<()> {
        check("OMAPFB_SETUP_MEM")?;
        record(Call::SetupMem(*info));
        self.mem.set(*info);
        Ok(())
    }

    fn set_update_mode(&self, mode: UpdateMode) -> Result<UpdateMode> {
        check("OMAPFB_SET_UPDATE_MODE")?;
        record(Call::SetUpdateMode(mode));
        // Panels that cannot do manual updates keep their own mode.
        Ok(PANEL_MODE.with(Cell::get))
    }

    fn update_mode(&self) -> Result<UpdateMode> {
        check("OMAPFB_GET_UPDATE_MODE")?;
        Ok(PANEL_MODE.with(Cell::get))
    }

    fn update_window(&self, window: &OmapfbUpdateWindow) -> Result<()> {
        check("OMAPFB_UPDATE_WINDOW")?;
        record(Call::UpdateWindow(*window));
        Ok(())
    }

    fn map(&self, len: usize) -> Result<FakeMapping> {
        check("mmap").map_err(|_| Error::Map {
            len,
            source: Errno::ENOMEM,
        })?;
        record(Call::Map(len));
        Ok(FakeMapping {
            data: vec![0; len],
        })
    }

    fn unmap(&self, mapping: FakeMapping) -> Result<()> {
        drop(mapping);
        check("munmap").map_err(|_| Error::Unmap(Errno::EINVAL))
    }
}

impl Drop for FakeDevice {
    fn drop(&mut self) {
        OPEN_NODES.with(|nodes| nodes.borrow_mut().remove(&self.path));
        record(Call::Close(self.path.clone()));
    }
}

#[derive(Debug)]
pub struct FakeMapping {
    data: Vec<u8>,
}

impl Deref for FakeMapping {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for FakeMapping {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Drop for FakeMapping {
    fn drop(&mut self) {
        record(Call::Unmap(self.data.len()));
    }
}

/// Initializes logging once per test binary (respects `RUST_LOG`).
pub fn setup_logging() {
    static LOG_ONCE: std::sync::Once = std::sync::Once::new();
    LOG_ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .with_test_writer()
            .try_init();
    });
}
