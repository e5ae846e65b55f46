//! In-process surfaces rendered by the desktop host as a panel.
//!
//! Frame decoding is not done here; a surface records its source and
//! playback state so the host can draw it and callers can inspect it.

use crate::playback::surface::{PlaybackSurface, SurfaceFactory, Viewport};
use crate::{BridgeError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Snapshot of one surface
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceInfo {
    pub id: Uuid,
    pub viewport: Viewport,
    pub source: Option<String>,
    pub attached: bool,
    pub playing: bool,
}

#[derive(Default)]
struct Registry {
    surfaces: Vec<SurfaceInfo>,
    created: usize,
    released: usize,
    max_concurrent: usize,
}

impl Registry {
    fn update(&mut self, id: Uuid, f: impl FnOnce(&mut SurfaceInfo)) {
        if let Some(info) = self.surfaces.iter_mut().find(|info| info.id == id) {
            f(info);
        }
    }

    fn attached_count(&self) -> usize {
        self.surfaces.iter().filter(|info| info.attached).count()
    }
}

/// Factory for panel surfaces; clones share the same registry
#[derive(Clone, Default)]
pub struct PanelSurfaces {
    registry: Arc<Mutex<Registry>>,
    fail_create: Arc<AtomicBool>,
    fail_start: Arc<AtomicBool>,
}

impl PanelSurfaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surfaces currently attached
    pub fn attached(&self) -> Vec<SurfaceInfo> {
        self.registry
            .lock()
            .surfaces
            .iter()
            .filter(|info| info.attached)
            .cloned()
            .collect()
    }

    /// The attached surface, if exactly one exists
    pub fn active(&self) -> Option<SurfaceInfo> {
        let mut attached = self.attached();
        if attached.len() == 1 {
            attached.pop()
        } else {
            None
        }
    }

    pub fn created(&self) -> usize {
        self.registry.lock().created
    }

    pub fn released(&self) -> usize {
        self.registry.lock().released
    }

    /// Highest number of simultaneously attached surfaces seen so far
    pub fn max_concurrent(&self) -> usize {
        self.registry.lock().max_concurrent
    }

    /// Make subsequent `create` calls fail
    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `start` calls fail
    pub fn fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }
}

impl SurfaceFactory for PanelSurfaces {
    fn create(&self, viewport: Viewport) -> Result<Box<dyn PlaybackSurface>> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(BridgeError::PlaybackError(
                "Surface creation refused".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let mut registry = self.registry.lock();
        registry.created += 1;
        registry.surfaces.push(SurfaceInfo {
            id,
            viewport,
            source: None,
            attached: false,
            playing: false,
        });

        Ok(Box::new(PanelSurface {
            id,
            registry: Arc::clone(&self.registry),
            fail_start: Arc::clone(&self.fail_start),
            released: false,
        }))
    }
}

pub struct PanelSurface {
    id: Uuid,
    registry: Arc<Mutex<Registry>>,
    fail_start: Arc<AtomicBool>,
    released: bool,
}

impl PlaybackSurface for PanelSurface {
    fn id(&self) -> Uuid {
        self.id
    }

    fn attach(&mut self) -> Result<()> {
        if self.released {
            return Err(BridgeError::PlaybackError(format!(
                "Surface {} already released",
                self.id
            )));
        }
        let mut registry = self.registry.lock();
        registry.update(self.id, |info| info.attached = true);
        registry.max_concurrent = registry.max_concurrent.max(registry.attached_count());
        Ok(())
    }

    fn set_source(&mut self, url: &str) {
        self.registry
            .lock()
            .update(self.id, |info| info.source = Some(url.to_string()));
    }

    fn start(&mut self) -> Result<()> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(BridgeError::PlaybackError(format!(
                "Surface {} could not open its source",
                self.id
            )));
        }
        self.registry.lock().update(self.id, |info| info.playing = true);
        Ok(())
    }

    fn stop(&mut self) {
        self.registry.lock().update(self.id, |info| info.playing = false);
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let mut registry = self.registry.lock();
        registry.surfaces.retain(|info| info.id != self.id);
        registry.released += 1;
    }
}

impl Drop for PanelSurface {
    fn drop(&mut self) {
        self.release();
    }
}
