//! Playback sink: one active surface at a time

use crate::playback::surface::{PlaybackSurface, SurfaceFactory, Viewport};
use crate::Result;
use tracing::{debug, error, info};

/// Owns the current playback surface. Must only be touched on the UI thread;
/// other threads reach it through [`crate::utils::UiQueue`].
pub struct PlaybackSink {
    factory: Box<dyn SurfaceFactory>,
    current: Option<Box<dyn PlaybackSurface>>,
    current_url: Option<String>,
    viewport: Viewport,
}

impl PlaybackSink {
    pub fn new(factory: Box<dyn SurfaceFactory>) -> Self {
        Self {
            factory,
            current: None,
            current_url: None,
            viewport: Viewport::default(),
        }
    }

    /// Update the area new surfaces fill
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Replace any active surface with a new one playing `url`.
    ///
    /// Failures are logged and swallowed; the next URL simply tries again.
    pub fn play(&mut self, url: &str) {
        info!("Preparing stream playback: {}", url);
        match self.replace_surface(url) {
            Ok(()) => info!("Stream playback started"),
            Err(e) => error!("Failed to start stream playback: {}", e),
        }
    }

    fn replace_surface(&mut self, url: &str) -> Result<()> {
        self.teardown();

        let mut surface = self.factory.create(self.viewport)?;
        if let Err(e) = surface.attach() {
            surface.release();
            return Err(e);
        }
        debug!(
            "Attached surface {} ({}x{})",
            surface.id(),
            self.viewport.width,
            self.viewport.height
        );

        surface.set_source(url);
        // kept even if start fails so the next play or teardown releases it
        let surface = self.current.insert(surface);
        self.current_url = Some(url.to_string());
        surface.start()
    }

    /// Stop and release the active surface, if any
    pub fn teardown(&mut self) {
        if let Some(mut surface) = self.current.take() {
            surface.stop();
            surface.release();
            debug!("Released surface {}", surface.id());
        }
        self.current_url = None;
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }
}

impl Drop for PlaybackSink {
    fn drop(&mut self) {
        self.teardown();
    }
}
