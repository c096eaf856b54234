// Native audio engine: Symphonia decode → convert → cpal output
// The output stream is owned by a dedicated playback thread

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::convert::SampleConverter;
use super::decoder::AudioDecoder;
use super::engine::{AudioEngine, EngineFactory};
use super::output::{AudioOutput, OutputSink};
use crate::error::MediaError;
use crate::media::MediaSelection;

/// How long the thread sleeps when the ring buffer is full or draining
const FEED_BACKOFF: Duration = Duration::from_millis(2);

#[derive(Debug)]
enum Command {
    Play,
    Pause,
    Stop,
}

struct Worker {
    commands: Sender<Command>,
    handle: JoinHandle<()>,
}

pub struct SymphoniaEngine {
    volume: f32,
    source: Option<PathBuf>,
    prepared: Option<AudioDecoder>,
    worker: Option<Worker>,
    playing: Arc<AtomicBool>,
    released: bool,
}

impl SymphoniaEngine {
    pub fn new(volume: f32) -> Self {
        Self {
            volume,
            source: None,
            prepared: None,
            worker: None,
            playing: Arc::new(AtomicBool::new(false)),
            released: false,
        }
    }

    fn ensure_live(&self) -> Result<(), MediaError> {
        if self.released {
            Err(MediaError::SourcePrepare("engine already released".to_string()))
        } else {
            Ok(())
        }
    }

    fn send(&self, command: Command) {
        if let Some(worker) = self.worker.as_ref() {
            if worker.commands.send(command).is_err() {
                tracing::warn!("playback thread is gone");
            }
        }
    }

    fn spawn_worker(&mut self, decoder: AudioDecoder) -> Result<(), MediaError> {
        let (commands, inbox) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
        let playing = self.playing.clone();
        let volume = self.volume;

        let handle = thread::Builder::new()
            .name("audio-playback".to_string())
            .spawn(move || {
                let output = match AudioOutput::open(volume) {
                    Ok(output) => output,
                    Err(e) => {
                        let _ = ready_tx.send(Err(format!("{:#}", e)));
                        return;
                    }
                };
                let converter = match SampleConverter::new(
                    decoder.sample_rate(),
                    decoder.channels(),
                    output.sample_rate(),
                    output.channels() as usize,
                ) {
                    Ok(converter) => converter,
                    Err(e) => {
                        let _ = ready_tx.send(Err(format!("{:#}", e)));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                Playback::new(decoder, output, converter, playing).run(inbox);
            })
            .map_err(|e| MediaError::Output(format!("failed to spawn playback thread: {e}")))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.worker = Some(Worker { commands, handle });
                Ok(())
            }
            Ok(Err(e)) => {
                join_worker(handle);
                Err(MediaError::Output(e))
            }
            Err(_) => {
                join_worker(handle);
                Err(MediaError::Output("playback thread exited during startup".to_string()))
            }
        }
    }
}

impl AudioEngine for SymphoniaEngine {
    fn bind(&mut self, source: &MediaSelection) -> Result<(), MediaError> {
        self.ensure_live()?;
        let path = source
            .as_path()
            .ok_or_else(|| MediaError::UnsupportedSource(source.to_string()))?;
        self.source = Some(path.to_path_buf());
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), MediaError> {
        self.ensure_live()?;
        let path = self
            .source
            .as_ref()
            .ok_or_else(|| MediaError::SourcePrepare("no data source bound".to_string()))?;
        let decoder = AudioDecoder::open(path).map_err(MediaError::prepare)?;
        tracing::debug!(
            ?path,
            sample_rate = decoder.sample_rate(),
            channels = decoder.channels(),
            duration = ?decoder.duration(),
            "prepared audio source"
        );
        self.prepared = Some(decoder);
        Ok(())
    }

    fn start(&mut self) -> Result<(), MediaError> {
        self.ensure_live()?;
        if self.worker.is_none() {
            let decoder = self
                .prepared
                .take()
                .ok_or_else(|| MediaError::SourcePrepare("start called before prepare".to_string()))?;
            self.spawn_worker(decoder)?;
        }
        self.playing.store(true, Ordering::SeqCst);
        self.send(Command::Play);
        Ok(())
    }

    fn pause(&mut self) {
        self.playing.store(false, Ordering::SeqCst);
        self.send(Command::Pause);
    }

    fn stop(&mut self) {
        self.playing.store(false, Ordering::SeqCst);
        self.send(Command::Stop);
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.playing.store(false, Ordering::SeqCst);
        self.prepared = None;
        if let Some(Worker { commands, handle }) = self.worker.take() {
            // Closing the channel ends the playback loop
            drop(commands);
            join_worker(handle);
        }
        tracing::debug!(source = ?self.source, "released audio engine");
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

impl Drop for SymphoniaEngine {
    fn drop(&mut self) {
        AudioEngine::release(self);
    }
}

fn join_worker(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        tracing::warn!("playback thread panicked");
    }
}

/// Creates `SymphoniaEngine`s at the configured volume
pub struct SymphoniaFactory {
    volume: f32,
}

impl SymphoniaFactory {
    pub fn new(volume: f32) -> Self {
        Self { volume }
    }
}

impl EngineFactory for SymphoniaFactory {
    fn create(&self) -> Box<dyn AudioEngine> {
        Box::new(SymphoniaEngine::new(self.volume))
    }
}

/// State owned by the playback thread
struct Playback<S: OutputSink> {
    decoder: AudioDecoder,
    output: S,
    converter: SampleConverter,
    playing: Arc<AtomicBool>,
    pending: Vec<f32>,
    active: bool,
    end_of_stream: bool,
    finished: bool,
}

impl<S: OutputSink> Playback<S> {
    fn new(decoder: AudioDecoder, output: S, converter: SampleConverter, playing: Arc<AtomicBool>) -> Self {
        Self {
            decoder,
            output,
            converter,
            playing,
            pending: Vec::new(),
            active: false,
            end_of_stream: false,
            finished: false,
        }
    }

    fn run(mut self, inbox: Receiver<Command>) {
        loop {
            let next = if self.active {
                match inbox.try_recv() {
                    Ok(command) => Some(command),
                    Err(TryRecvError::Empty) => None,
                    Err(TryRecvError::Disconnected) => break,
                }
            } else {
                match inbox.recv_timeout(Duration::from_millis(100)) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            };

            match next {
                Some(command) => self.apply(command),
                None => self.feed(),
            }
        }
        self.output.clear();
        tracing::debug!("playback thread exiting");
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Play => {
                if self.finished {
                    self.rewind();
                }
                if let Err(e) = self.output.resume() {
                    tracing::warn!("{e:#}");
                }
                self.active = true;
            }
            Command::Pause => {
                if let Err(e) = self.output.pause() {
                    tracing::warn!("{e:#}");
                }
                self.active = false;
            }
            Command::Stop => {
                self.output.clear();
                self.rewind();
                self.active = false;
            }
        }
    }

    fn rewind(&mut self) {
        self.pending.clear();
        self.converter.reset();
        self.end_of_stream = false;
        self.finished = false;
        if let Err(e) = self.decoder.rewind() {
            tracing::warn!("{e:#}");
        }
    }

    fn feed(&mut self) {
        if self.pending.is_empty() {
            if self.end_of_stream {
                // Let the ring buffer drain before reporting completion
                if self.output.queued() == 0 {
                    self.complete();
                } else {
                    thread::sleep(FEED_BACKOFF);
                }
                return;
            }
            match self.decoder.decode_next() {
                Ok(Some(samples)) => match self.converter.process(&samples) {
                    Ok(converted) => self.pending = converted,
                    Err(e) => {
                        tracing::warn!("{e:#}");
                        self.complete();
                    }
                },
                Ok(None) => {
                    self.end_of_stream = true;
                    match self.converter.flush() {
                        Ok(tail) => self.pending = tail,
                        Err(e) => tracing::warn!("{e:#}"),
                    }
                }
                Err(e) => {
                    tracing::warn!("playback stopped: {e:#}");
                    self.complete();
                }
            }
            return;
        }

        let written = self.output.write(&self.pending);
        self.pending.drain(..written);
        if written == 0 {
            thread::sleep(FEED_BACKOFF);
        }
    }

    fn complete(&mut self) {
        tracing::debug!("playback completed");
        self.active = false;
        self.finished = true;
        self.pending.clear();
        self.playing.store(false, Ordering::SeqCst);
    }
}
