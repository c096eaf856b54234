// Audio decoder using Symphonia
// Decodes a bound source to interleaved f32 PCM

use anyhow::{anyhow, Context, Result};
use symphonia::core::audio::{AudioBufferRef, AudioPlanes, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

pub struct AudioDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: usize,
    duration: Option<Duration>,
}

impl AudioDecoder {
    /// Open an audio file and prepare for decoding
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open audio file: {:?}", path))?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint using the file extension
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .context("Failed to probe file format")?;

        let format = probed.format;

        // First track with a real codec
        let track = format.tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| anyhow!("No audio track found"))?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
        let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(2);

        let duration = track.codec_params.n_frames.map(|frames| {
            Duration::from_secs_f64(frames as f64 / sample_rate as f64)
        });

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .context("Failed to create decoder")?;

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
            duration,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Decode next packet, returns interleaved f32 samples
    /// Returns None when end of stream is reached
    pub fn decode_next(&mut self) -> Result<Option<Vec<f32>>> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => return Err(e).context("Failed to read packet"),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    return Ok(Some(Self::audio_buf_to_f32(&decoded)));
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::debug!("decode error (skipping packet): {e}");
                    continue;
                }
                Err(e) => return Err(e).context("Decode failed"),
            }
        }
    }

    /// Seek back to the first frame
    pub fn rewind(&mut self) -> Result<()> {
        self.format
            .seek(
                SeekMode::Accurate,
                SeekTo::TimeStamp { ts: 0, track_id: self.track_id },
            )
            .context("Rewind failed")?;
        self.decoder.reset();
        Ok(())
    }

    /// Convert any AudioBufferRef to interleaved f32 samples
    fn audio_buf_to_f32(buf: &AudioBufferRef) -> Vec<f32> {
        match buf {
            AudioBufferRef::F32(b) => interleave(b.planes(), b.frames(), |s: f32| s),
            AudioBufferRef::F64(b) => interleave(b.planes(), b.frames(), |s: f64| s as f32),
            AudioBufferRef::S8(b) => interleave(b.planes(), b.frames(), |s: i8| s as f32 / 128.0),
            AudioBufferRef::S16(b) => interleave(b.planes(), b.frames(), |s: i16| s as f32 / 32768.0),
            AudioBufferRef::S24(b) => {
                interleave(b.planes(), b.frames(), |s| s.inner() as f32 / 8388608.0)
            }
            AudioBufferRef::S32(b) => {
                interleave(b.planes(), b.frames(), |s: i32| s as f32 / 2147483648.0)
            }
            AudioBufferRef::U8(b) => {
                interleave(b.planes(), b.frames(), |s: u8| (s as f32 - 128.0) / 128.0)
            }
            AudioBufferRef::U16(b) => {
                interleave(b.planes(), b.frames(), |s: u16| (s as f32 - 32768.0) / 32768.0)
            }
            AudioBufferRef::U24(b) => {
                interleave(b.planes(), b.frames(), |s| (s.inner() as f32 - 8388608.0) / 8388608.0)
            }
            AudioBufferRef::U32(b) => interleave(b.planes(), b.frames(), |s: u32| {
                (s as f64 - 2147483648.0) as f32 / 2147483648.0
            }),
        }
    }
}

fn interleave<T: Sample + Copy, F: Fn(T) -> f32>(
    planes: AudioPlanes<T>,
    frames: usize,
    convert: F,
) -> Vec<f32> {
    let planes = planes.planes();
    if planes.is_empty() || frames == 0 {
        return vec![];
    }

    let mut interleaved = Vec::with_capacity(frames * planes.len());
    for frame in 0..frames {
        for plane in planes {
            interleaved.push(convert(plane[frame]));
        }
    }
    interleaved
}
