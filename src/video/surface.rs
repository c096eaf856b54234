// Video rendering surface
// The webview's <video> element does the decoding and drawing; this side
// sends it commands and mirrors what it reports back

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tauri::{AppHandle, Emitter};

use crate::media::MediaSelection;

/// Something the surface reported asynchronously
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurfaceEvent {
    Prepared { duration_ms: u64 },
    Completed,
    Error { message: String },
}

/// A surface event tagged with the binding it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SurfaceReport {
    pub binding: u64,
    #[serde(flatten)]
    pub event: SurfaceEvent,
}

pub trait VideoSurface: Send {
    /// Attach a source; `binding` is echoed back in every report for it
    fn bind(&mut self, source: &MediaSelection, binding: u64);
    fn start(&mut self);
    fn pause(&mut self);
    /// Stop entirely and drop the source
    fn stop_playback(&mut self);
    fn is_playing(&self) -> bool;
    /// Playable duration, known once the source is prepared
    fn duration(&self) -> Option<Duration>;
    /// Fold a report for the current binding into the surface state
    fn observe(&mut self, event: &SurfaceEvent);
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum SurfaceCommand {
    Bind { src: String, local: bool, binding: u64 },
    Start,
    Pause,
    Stop,
}

/// Drives the front end's video element through `video-surface` events
pub struct WebviewSurface {
    app: AppHandle,
    bound: bool,
    playing: bool,
    duration: Option<Duration>,
}

impl WebviewSurface {
    pub fn new(app: AppHandle) -> Self {
        Self {
            app,
            bound: false,
            playing: false,
            duration: None,
        }
    }

    fn send(&self, command: SurfaceCommand) {
        if let Err(e) = self.app.emit("video-surface", &command) {
            tracing::warn!(?command, "failed to reach video surface: {e}");
        }
    }
}

impl VideoSurface for WebviewSurface {
    fn bind(&mut self, source: &MediaSelection, binding: u64) {
        let (src, local) = match source {
            MediaSelection::Path(path) => (path.to_string_lossy().to_string(), true),
            MediaSelection::Uri(uri) => (uri.clone(), false),
        };
        self.bound = true;
        self.playing = false;
        self.duration = None;
        self.send(SurfaceCommand::Bind { src, local, binding });
    }

    fn start(&mut self) {
        if self.bound {
            self.playing = true;
            self.send(SurfaceCommand::Start);
        }
    }

    fn pause(&mut self) {
        if self.bound {
            self.playing = false;
            self.send(SurfaceCommand::Pause);
        }
    }

    fn stop_playback(&mut self) {
        self.bound = false;
        self.playing = false;
        self.duration = None;
        self.send(SurfaceCommand::Stop);
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn observe(&mut self, event: &SurfaceEvent) {
        match event {
            SurfaceEvent::Prepared { duration_ms } if self.bound && *duration_ms > 0 => {
                self.duration = Some(Duration::from_millis(*duration_ms));
            }
            SurfaceEvent::Prepared { .. } => {}
            SurfaceEvent::Completed => self.playing = false,
            SurfaceEvent::Error { .. } => {
                self.bound = false;
                self.playing = false;
                self.duration = None;
            }
        }
    }
}
