// Video playback module
// Rendering happens in the webview; the controller keeps the session state

pub mod controller;
pub mod surface;

pub use controller::{VideoController, VideoView};
pub use surface::{SurfaceReport, WebviewSurface};
