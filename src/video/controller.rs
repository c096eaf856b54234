// Video player controller
use serde::Serialize;

use super::surface::{SurfaceEvent, SurfaceReport, VideoSurface};
use crate::error::MediaError;
use crate::media::{MediaSelection, PlaybackState};
use crate::notice::{Notice, Notifier};
use crate::settings::StopPolicy;

pub const PLAY_CAPTION: &str = "Play Video";
pub const PAUSE_CAPTION: &str = "Pause Video";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoView {
    pub state: PlaybackState,
    pub caption: &'static str,
    pub source: Option<String>,
    pub duration_ms: Option<u64>,
}

pub struct VideoController {
    surface: Box<dyn VideoSurface>,
    source: Option<MediaSelection>,
    state: PlaybackState,
    binding: u64,
    stop_policy: StopPolicy,
}

impl VideoController {
    pub fn new(surface: Box<dyn VideoSurface>, stop_policy: StopPolicy) -> Self {
        Self {
            surface,
            source: None,
            state: PlaybackState::Idle,
            binding: 0,
            stop_policy,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn caption(&self) -> &'static str {
        match self.state {
            PlaybackState::Playing => PAUSE_CAPTION,
            PlaybackState::Idle | PlaybackState::Paused => PLAY_CAPTION,
        }
    }

    pub fn view(&self) -> VideoView {
        VideoView {
            state: self.state(),
            caption: self.caption(),
            source: self.source.as_ref().map(|s| s.display_name()),
            duration_ms: self.surface.duration().map(|d| d.as_millis() as u64),
        }
    }

    pub fn load(&mut self, selection: MediaSelection) {
        self.binding += 1;
        self.surface.bind(&selection, self.binding);
        self.surface.start();
        tracing::info!(source = %selection, binding = self.binding, "video playing");
        self.source = Some(selection);
        self.state = PlaybackState::Playing;
    }

    pub fn toggle_play_pause(&mut self, notifier: &dyn Notifier) {
        if self.surface.duration().is_none() {
            notifier.notify(Notice::PickVideoFirst);
            return;
        }

        if self.surface.is_playing() {
            self.surface.pause();
            self.state = PlaybackState::Paused;
        } else {
            self.surface.start();
            self.state = PlaybackState::Playing;
        }
    }

    pub fn stop(&mut self) {
        let acts = match self.stop_policy {
            StopPolicy::WhilePlaying => self.surface.is_playing(),
            StopPolicy::AnyLoaded => self.state != PlaybackState::Idle,
        };
        if !acts {
            return;
        }

        self.surface.stop_playback();
        self.source = None;
        self.state = PlaybackState::Idle;
        tracing::info!("video stopped");
    }

    /// Apply an asynchronous report from the surface
    pub fn on_surface_report(&mut self, report: SurfaceReport, notifier: &dyn Notifier) {
        if report.binding != self.binding || self.source.is_none() {
            tracing::debug!(binding = report.binding, current = self.binding, "ignoring stale surface report");
            return;
        }

        self.surface.observe(&report.event);
        match report.event {
            SurfaceEvent::Prepared { duration_ms } => {
                tracing::debug!(duration_ms, "video prepared");
            }
            SurfaceEvent::Completed => {
                self.state = PlaybackState::Paused;
            }
            SurfaceEvent::Error { message } => {
                let err = MediaError::SourcePlayback(message);
                tracing::warn!(source = ?self.source, "{err}");
                self.surface.stop_playback();
                self.source = None;
                self.state = PlaybackState::Idle;
                notifier.notify(Notice::VideoError);
            }
        }
    }

    pub fn teardown(&mut self) {
        if self.surface.is_playing() {
            self.surface.stop_playback();
        }
        self.source = None;
        self.state = PlaybackState::Idle;
    }
}
