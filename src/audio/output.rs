// Audio output using cpal
// Default output device fed through a lock-free ring buffer

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use parking_lot::Mutex;
use ringbuf::{HeapRb, traits::{Consumer, Observer, Producer, Split}};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const RING_BUFFER_SIZE: usize = 48000 * 2 / 4; // ~250ms of stereo audio at 48kHz

type RingProducer = ringbuf::HeapProd<f32>;
type RingConsumer = ringbuf::HeapCons<f32>;

/// What the playback loop needs from an output device
pub trait OutputSink {
    /// Queue as many samples as fit; returns how many were taken
    fn write(&mut self, samples: &[f32]) -> usize;
    /// Samples still waiting to be played
    fn queued(&self) -> usize;
    /// Discard queued samples
    fn clear(&self);
    fn pause(&self) -> Result<()>;
    fn resume(&self) -> Result<()>;
}

/// Owns the device stream; not `Send`, so it lives on the playback thread
pub struct AudioOutput {
    stream: Stream,
    producer: RingProducer,
    sample_rate: u32,
    channels: u16,
    clear_flag: Arc<AtomicBool>,
}

impl AudioOutput {
    /// Open the default output device and start its stream
    pub fn open(volume: f32) -> Result<Self> {
        let host = cpal::default_host();

        let device = host.default_output_device()
            .ok_or_else(|| anyhow!("No output device available"))?;

        let config = device.default_output_config()
            .context("Failed to get default output config")?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();
        tracing::debug!(sample_rate, channels, format = ?config.sample_format(), "output device config");

        let (producer, consumer) = HeapRb::<f32>::new(RING_BUFFER_SIZE).split();

        let volume = Arc::new(Mutex::new(volume.clamp(0.0, 1.0)));
        let clear_flag = Arc::new(AtomicBool::new(false));

        let stream_config: StreamConfig = config.clone().into();
        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &stream_config, consumer, volume.clone(), clear_flag.clone())?
            }
            cpal::SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &stream_config, consumer, volume.clone(), clear_flag.clone())?
            }
            cpal::SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &stream_config, consumer, volume.clone(), clear_flag.clone())?
            }
            format => return Err(anyhow!("Unsupported sample format: {:?}", format)),
        };

        stream.play().context("Failed to start stream")?;

        Ok(Self {
            stream,
            producer,
            sample_rate,
            channels,
            clear_flag,
        })
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &cpal::Device,
        config: &StreamConfig,
        mut consumer: RingConsumer,
        volume: Arc<Mutex<f32>>,
        clear_flag: Arc<AtomicBool>,
    ) -> Result<Stream> {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let vol = *volume.lock();

                // Drop everything still queued, e.g. after stop
                if clear_flag.swap(false, Ordering::SeqCst) {
                    consumer.clear();
                }

                for sample in data.iter_mut() {
                    let value = consumer.try_pop().unwrap_or(0.0) * vol;
                    *sample = T::from_sample(value);
                }
            },
            move |err| {
                tracing::error!(%err, "audio output stream error");
            },
            None,
        ).context("Failed to build output stream")?;

        Ok(stream)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl OutputSink for AudioOutput {
    fn write(&mut self, samples: &[f32]) -> usize {
        self.producer.push_slice(samples)
    }

    fn queued(&self) -> usize {
        self.producer.occupied_len()
    }

    /// Takes effect on the next device callback
    fn clear(&self) {
        self.clear_flag.store(true, Ordering::SeqCst);
    }

    fn pause(&self) -> Result<()> {
        self.stream.pause().context("Failed to pause stream")
    }

    fn resume(&self) -> Result<()> {
        self.stream.play().context("Failed to resume stream")
    }
}
