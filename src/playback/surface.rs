//! Rendering surfaces the playback sink drives

use crate::Result;
use uuid::Uuid;

/// Area a surface fills, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A video surface. Lives on the UI-owning thread.
pub trait PlaybackSurface {
    fn id(&self) -> Uuid;

    /// Attach to the host view hierarchy
    fn attach(&mut self) -> Result<()>;

    fn set_source(&mut self, url: &str);

    fn start(&mut self) -> Result<()>;

    fn stop(&mut self);

    /// Detach and free resources. The surface is unusable afterwards.
    fn release(&mut self);
}

/// Builds surfaces sized to fill a viewport
pub trait SurfaceFactory {
    fn create(&self, viewport: Viewport) -> Result<Box<dyn PlaybackSurface>>;
}
