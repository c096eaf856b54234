// Audio player controller
// Idle → Playing ⇄ Paused → Idle, owning at most one engine at a time

use serde::Serialize;

use super::engine::{AudioEngine, EngineFactory, ResourceSlot};
use crate::error::MediaError;
use crate::media::{MediaSelection, PlaybackState};
use crate::notice::{Notice, Notifier};
use crate::settings::StopPolicy;

pub const PLAY_CAPTION: &str = "Play Audio";
pub const PAUSE_CAPTION: &str = "Pause Audio";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioView {
    pub state: PlaybackState,
    pub caption: &'static str,
    pub source: Option<String>,
}

pub struct AudioController {
    factory: Box<dyn EngineFactory>,
    engine: ResourceSlot<Box<dyn AudioEngine>>,
    source: Option<MediaSelection>,
    state: PlaybackState,
    stop_policy: StopPolicy,
}

impl AudioController {
    pub fn new(factory: Box<dyn EngineFactory>, stop_policy: StopPolicy) -> Self {
        Self {
            factory,
            engine: ResourceSlot::empty(),
            source: None,
            state: PlaybackState::Idle,
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

    pub fn view(&self) -> AudioView {
        AudioView {
            state: self.state(),
            caption: self.caption(),
            source: self.source.as_ref().map(|s| s.display_name()),
        }
    }

    /// Replace whatever is loaded with `selection` and start it
    pub fn load(&mut self, selection: MediaSelection, notifier: &dyn Notifier) {
        let factory = &self.factory;
        let engine = self.engine.replace_with(|| factory.create());

        match start_fresh(&mut **engine, &selection) {
            Ok(()) => {
                tracing::info!(source = %selection, "audio playing");
                self.source = Some(selection);
                self.state = PlaybackState::Playing;
            }
            Err(e) => {
                tracing::warn!(source = %selection, "audio failed to start: {e}");
                self.engine.clear();
                self.source = None;
                self.state = PlaybackState::Idle;
                notifier.notify(Notice::AudioError);
            }
        }
    }

    pub fn toggle_play_pause(&mut self, notifier: &dyn Notifier) {
        let Some(engine) = self.engine.get_mut() else {
            notifier.notify(Notice::PickAudioFirst);
            return;
        };

        if engine.is_playing() {
            engine.pause();
            self.state = PlaybackState::Paused;
        } else {
            match engine.start() {
                Ok(()) => self.state = PlaybackState::Playing,
                Err(e) => {
                    tracing::warn!("audio failed to resume: {e}");
                    self.engine.clear();
                    self.source = None;
                    self.state = PlaybackState::Idle;
                    notifier.notify(Notice::AudioError);
                }
            }
        }
    }

    pub fn stop(&mut self) {
        let acts = match self.state {
            PlaybackState::Idle => false,
            PlaybackState::Playing => true,
            PlaybackState::Paused => self.stop_policy == StopPolicy::AnyLoaded,
        };
        if !acts {
            return;
        }

        if let Some(engine) = self.engine.get_mut() {
            engine.stop();
        }
        self.engine.clear();
        self.source = None;
        self.state = PlaybackState::Idle;
        tracing::info!("audio stopped");
    }

    pub fn teardown(&mut self) {
        if self.engine.is_occupied() {
            tracing::debug!("releasing audio engine on teardown");
        }
        self.engine.clear();
        self.source = None;
        self.state = PlaybackState::Idle;
    }
}

fn start_fresh(engine: &mut dyn AudioEngine, selection: &MediaSelection) -> Result<(), MediaError> {
    engine.bind(selection)?;
    engine.prepare()?;
    engine.start()
}
