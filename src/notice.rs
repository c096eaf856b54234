// Transient user notices (toasts)
use tauri::{AppHandle, Emitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    PickAudioFirst,
    PickVideoFirst,
    PermissionRequired,
    AudioError,
    VideoError,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::PickAudioFirst => "Pick an audio file first",
            Notice::PickVideoFirst => "Pick a video file first",
            Notice::PermissionRequired => "Permission required to access media files",
            Notice::AudioError => "Error playing audio",
            Notice::VideoError => "Error playing video",
        }
    }
}

/// Somewhere to show short, non-blocking messages
pub trait Notifier: Send {
    fn notify(&self, notice: Notice);
}

/// Emits `notice` events for the front end to show as toasts
pub struct EventNotifier {
    app: AppHandle,
}

impl EventNotifier {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl Notifier for EventNotifier {
    fn notify(&self, notice: Notice) {
        tracing::info!(message = notice.message(), "notice");
        if let Err(e) = self.app.emit("notice", notice.message()) {
            tracing::warn!("failed to emit notice: {e}");
        }
    }
}
