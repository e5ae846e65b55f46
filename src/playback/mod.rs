pub mod panel;
pub mod sink;
pub mod surface;

pub use panel::{PanelSurfaces, SurfaceInfo};
pub use sink::PlaybackSink;
pub use surface::{PlaybackSurface, SurfaceFactory, Viewport};
