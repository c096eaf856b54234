// Test doubles for the platform collaborators
use parking_lot::Mutex;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::audio::engine::{AudioEngine, EngineFactory};
use crate::audio::output::OutputSink;
use crate::error::MediaError;
use crate::media::MediaSelection;
use crate::notice::{Notice, Notifier};
use crate::video::surface::{SurfaceEvent, VideoSurface};

/// Keeps every notice; clones share the same log
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    seen: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.seen.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.seen.lock().push(notice);
    }
}

#[derive(Default)]
struct EngineBook {
    created: usize,
    live: usize,
    peak_live: usize,
    fail_prepare: Vec<String>,
    playing: Vec<Arc<Mutex<bool>>>,
}

/// Hands out `FakeEngine`s and counts how many are alive
#[derive(Clone, Default)]
pub struct FakeEngineFactory {
    book: Arc<Mutex<EngineBook>>,
}

impl FakeEngineFactory {
    pub fn created(&self) -> usize {
        self.book.lock().created
    }

    pub fn live(&self) -> usize {
        self.book.lock().live
    }

    pub fn peak_live(&self) -> usize {
        self.book.lock().peak_live
    }

    /// Make `prepare` fail for sources whose file name is `name`
    pub fn fail_prepare_for(&self, name: &str) {
        self.book.lock().fail_prepare.push(name.to_string());
    }

    /// Simulate every engine reaching the end of its source
    pub fn finish_playback(&self) {
        for playing in &self.book.lock().playing {
            *playing.lock() = false;
        }
    }
}

impl EngineFactory for FakeEngineFactory {
    fn create(&self) -> Box<dyn AudioEngine> {
        let playing = Arc::new(Mutex::new(false));
        let mut book = self.book.lock();
        book.created += 1;
        book.live += 1;
        book.peak_live = book.peak_live.max(book.live);
        book.playing.push(playing.clone());
        Box::new(FakeEngine {
            book: self.book.clone(),
            source: None,
            prepared: false,
            playing,
            released: false,
        })
    }
}

pub struct FakeEngine {
    book: Arc<Mutex<EngineBook>>,
    source: Option<MediaSelection>,
    prepared: bool,
    playing: Arc<Mutex<bool>>,
    released: bool,
}

impl AudioEngine for FakeEngine {
    fn bind(&mut self, source: &MediaSelection) -> Result<(), MediaError> {
        self.source = Some(source.clone());
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), MediaError> {
        let name = self.source.as_ref().map(|s| s.display_name()).unwrap_or_default();
        if self.book.lock().fail_prepare.contains(&name) {
            return Err(MediaError::SourcePrepare(format!("cannot decode {name}")));
        }
        self.prepared = true;
        Ok(())
    }

    fn start(&mut self) -> Result<(), MediaError> {
        if !self.prepared || self.released {
            return Err(MediaError::SourcePrepare("not prepared".to_string()));
        }
        *self.playing.lock() = true;
        Ok(())
    }

    fn pause(&mut self) {
        *self.playing.lock() = false;
    }

    fn stop(&mut self) {
        *self.playing.lock() = false;
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            *self.playing.lock() = false;
            self.book.lock().live -= 1;
        }
    }

    fn is_playing(&self) -> bool {
        *self.playing.lock()
    }
}

#[derive(Default)]
struct SurfaceBook {
    bound: Option<MediaSelection>,
    playing: bool,
    duration: Option<Duration>,
    stops: usize,
}

/// In-memory surface with the same readiness rules as the webview one
#[derive(Clone, Default)]
pub struct FakeSurface {
    book: Arc<Mutex<SurfaceBook>>,
}

impl FakeSurface {
    pub fn stops(&self) -> usize {
        self.book.lock().stops
    }

    pub fn bound(&self) -> Option<MediaSelection> {
        self.book.lock().bound.clone()
    }
}

impl VideoSurface for FakeSurface {
    fn bind(&mut self, source: &MediaSelection, _binding: u64) {
        let mut book = self.book.lock();
        book.bound = Some(source.clone());
        book.playing = false;
        book.duration = None;
    }

    fn start(&mut self) {
        let mut book = self.book.lock();
        if book.bound.is_some() {
            book.playing = true;
        }
    }

    fn pause(&mut self) {
        self.book.lock().playing = false;
    }

    fn stop_playback(&mut self) {
        let mut book = self.book.lock();
        book.bound = None;
        book.playing = false;
        book.duration = None;
        book.stops += 1;
    }

    fn is_playing(&self) -> bool {
        self.book.lock().playing
    }

    fn duration(&self) -> Option<Duration> {
        self.book.lock().duration
    }

    fn observe(&mut self, event: &SurfaceEvent) {
        let mut book = self.book.lock();
        match event {
            SurfaceEvent::Prepared { duration_ms } if book.bound.is_some() => {
                book.duration = Some(Duration::from_millis(*duration_ms));
            }
            SurfaceEvent::Prepared { .. } => {}
            SurfaceEvent::Completed => book.playing = false,
            SurfaceEvent::Error { .. } => {
                book.bound = None;
                book.playing = false;
                book.duration = None;
            }
        }
    }
}

/// Write a 16-bit 440 Hz tone with the same sample in every channel
pub fn write_tone_wav(path: &Path, sample_rate: u32, channels: u16, frames: usize) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let v = ((t * 440.0 * std::f32::consts::TAU).sin() * 0.5 * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(v).expect("write sample");
        }
    }
    writer.finalize().expect("finalize");
}

#[derive(Default)]
struct SinkBook {
    written: usize,
    clears: usize,
    pauses: usize,
    resumes: usize,
}

/// Output that plays everything instantly and counts what it was asked to do
#[derive(Clone, Default)]
pub struct RecordingSink {
    book: Arc<Mutex<SinkBook>>,
}

impl RecordingSink {
    pub fn written(&self) -> usize {
        self.book.lock().written
    }

    pub fn clears(&self) -> usize {
        self.book.lock().clears
    }

    pub fn pauses(&self) -> usize {
        self.book.lock().pauses
    }

    pub fn resumes(&self) -> usize {
        self.book.lock().resumes
    }
}

impl OutputSink for RecordingSink {
    fn write(&mut self, samples: &[f32]) -> usize {
        self.book.lock().written += samples.len();
        samples.len()
    }

    fn queued(&self) -> usize {
        0
    }

    fn clear(&self) {
        self.book.lock().clears += 1;
    }

    fn pause(&self) -> anyhow::Result<()> {
        self.book.lock().pauses += 1;
        Ok(())
    }

    fn resume(&self) -> anyhow::Result<()> {
        self.book.lock().resumes += 1;
        Ok(())
    }
}

/// Collects tracing events emitted on the current thread inside `capture`
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CapturedLogs {
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn at(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = MessageField::default();
        event.record(&mut message);
        self.events.lock().push((*event.metadata().level(), message.0));
    }
}

#[derive(Default)]
struct MessageField(String);

impl Visit for MessageField {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}
