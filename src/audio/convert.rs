// Sample conversion between the decoded stream and the output device:
// channel remapping and sample rate conversion (rubato)

use anyhow::{Context, Result};
use rubato::{FftFixedIn, Resampler};

/// Requested resampler chunk; rubato may round it
const RESAMPLE_CHUNK: usize = 1024;

/// Upper bound on silent chunks pushed through to drain the resampler delay
const MAX_DRAIN_CHUNKS: usize = 16;

/// Map interleaved frames from one channel count to another
pub fn remap_channels(samples: &[f32], from: usize, to: usize) -> Vec<f32> {
    if from == to || from == 0 || to == 0 {
        return samples.to_vec();
    }

    let frames = samples.len() / from;
    let mut out = Vec::with_capacity(frames * to);
    for frame in samples.chunks_exact(from) {
        if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            for ch in 0..to {
                out.push(frame[ch % from]);
            }
        }
    }
    out
}

/// Fixed-ratio sample rate converter over interleaved audio
pub struct RateConverter {
    resampler: FftFixedIn<f32>,
    channels: usize,
    input_rate: u32,
    output_rate: u32,
    pending: Vec<Vec<f32>>,
    frames_in: u64,
    frames_out: u64,
    /// Leading output frames that are filter delay, not signal
    delay_left: usize,
}

impl RateConverter {
    pub fn new(input_rate: u32, output_rate: u32, channels: usize) -> Result<Self> {
        let resampler = FftFixedIn::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            RESAMPLE_CHUNK,
            2,
            channels,
        )
        .context("Failed to create resampler")?;
        let delay_left = resampler.output_delay();

        Ok(Self {
            resampler,
            channels,
            input_rate,
            output_rate,
            pending: vec![Vec::new(); channels],
            frames_in: 0,
            frames_out: 0,
            delay_left,
        })
    }

    /// Feed interleaved samples, get back whatever full chunks produced
    pub fn process(&mut self, samples: &[f32]) -> Result<Vec<f32>> {
        for frame in samples.chunks_exact(self.channels) {
            for (ch, &s) in frame.iter().enumerate() {
                self.pending[ch].push(s);
            }
        }
        self.frames_in += (samples.len() / self.channels) as u64;

        let mut out = Vec::new();
        loop {
            let needed = self.resampler.input_frames_next();
            if self.pending[0].len() < needed {
                break;
            }
            let chunk: Vec<Vec<f32>> = self
                .pending
                .iter_mut()
                .map(|buf| buf.drain(..needed).collect())
                .collect();
            self.run_chunk(&chunk, &mut out)?;
        }
        Ok(out)
    }

    /// Push out the tail, zero-padded, trimmed to the exact converted length
    pub fn flush(&mut self) -> Result<Vec<f32>> {
        let expected = self.frames_in * self.output_rate as u64 / self.input_rate as u64;
        let produced_before = self.frames_out;
        let mut out = Vec::new();

        // Silence after the last real frame pushes the delayed tail out
        let mut chunks = 0;
        while self.frames_out < expected && chunks < MAX_DRAIN_CHUNKS {
            let needed = self.resampler.input_frames_next();
            let chunk: Vec<Vec<f32>> = self
                .pending
                .iter_mut()
                .map(|buf| {
                    let mut padded: Vec<f32> = buf.drain(..).collect();
                    padded.resize(needed, 0.0);
                    padded
                })
                .collect();
            self.run_chunk(&chunk, &mut out)?;
            chunks += 1;
        }
        for buf in &mut self.pending {
            buf.clear();
        }

        let keep_frames = expected.saturating_sub(produced_before) as usize;
        out.truncate(keep_frames.min(out.len() / self.channels) * self.channels);
        self.frames_out = produced_before + (out.len() / self.channels) as u64;
        Ok(out)
    }

    pub fn reset(&mut self) {
        self.resampler.reset();
        for buf in &mut self.pending {
            buf.clear();
        }
        self.frames_in = 0;
        self.frames_out = 0;
        self.delay_left = self.resampler.output_delay();
    }

    fn run_chunk(&mut self, chunk: &[Vec<f32>], out: &mut Vec<f32>) -> Result<()> {
        let resampled = self
            .resampler
            .process(chunk, None)
            .context("Resampling failed")?;
        let frames = resampled.first().map(|c| c.len()).unwrap_or(0);
        let skip = self.delay_left.min(frames);
        self.delay_left -= skip;

        out.reserve((frames - skip) * self.channels);
        for i in skip..frames {
            for plane in &resampled {
                out.push(plane[i]);
            }
        }
        self.frames_out += (frames - skip) as u64;
        Ok(())
    }
}

/// Decoded stream → device format
pub struct SampleConverter {
    from_channels: usize,
    to_channels: usize,
    rate: Option<RateConverter>,
}

impl SampleConverter {
    pub fn new(input_rate: u32, input_channels: usize, output_rate: u32, output_channels: usize) -> Result<Self> {
        let rate = if input_rate != output_rate {
            tracing::debug!(from = input_rate, to = output_rate, "will resample output");
            Some(RateConverter::new(input_rate, output_rate, output_channels)?)
        } else {
            None
        };

        Ok(Self {
            from_channels: input_channels,
            to_channels: output_channels,
            rate,
        })
    }

    pub fn process(&mut self, samples: &[f32]) -> Result<Vec<f32>> {
        let remapped = remap_channels(samples, self.from_channels, self.to_channels);
        match self.rate.as_mut() {
            Some(rate) => rate.process(&remapped),
            None => Ok(remapped),
        }
    }

    pub fn flush(&mut self) -> Result<Vec<f32>> {
        match self.rate.as_mut() {
            Some(rate) => rate.flush(),
            None => Ok(Vec::new()),
        }
    }

    pub fn reset(&mut self) {
        if let Some(rate) = self.rate.as_mut() {
            rate.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_to_stereo_duplicates() {
        assert_eq!(remap_channels(&[0.1, 0.2], 1, 2), vec![0.1, 0.1, 0.2, 0.2]);
    }

    #[test]
    fn test_stereo_to_mono_averages() {
        assert_eq!(remap_channels(&[0.2, 0.4, -1.0, 1.0], 2, 1), vec![0.3, 0.0]);
    }

    #[test]
    fn test_stereo_to_surround_repeats_pairs() {
        let out = remap_channels(&[0.1, 0.2], 2, 4);
        assert_eq!(out, vec![0.1, 0.2, 0.1, 0.2]);
    }

    #[test]
    fn test_same_layout_is_untouched() {
        let samples = [0.5, -0.5, 0.25, -0.25];
        assert_eq!(remap_channels(&samples, 2, 2), samples.to_vec());
    }

    #[test]
    fn test_resample_produces_converted_length() {
        let mut converter = RateConverter::new(44100, 48000, 2).expect("resampler");
        let input = vec![0.0f32; 44100 * 2];

        let mut out = Vec::new();
        for block in input.chunks(1000 * 2) {
            out.extend(converter.process(block).expect("process"));
        }
        out.extend(converter.flush().expect("flush"));

        assert_eq!(out.len(), 48000 * 2);
    }

    #[test]
    fn test_resample_keeps_the_final_frames() {
        let mut converter = RateConverter::new(44100, 48000, 2).expect("resampler");
        let mut input = vec![0.0f32; 40000 * 2];
        input.extend(std::iter::repeat(1.0f32).take(4410 * 2));

        let mut out = Vec::new();
        for block in input.chunks(1000 * 2) {
            out.extend(converter.process(block).expect("process"));
        }
        out.extend(converter.flush().expect("flush"));

        assert_eq!(out.len() / 2, 44410 * 48000 / 44100);
        let loud = out.chunks_exact(2).filter(|frame| frame[0] > 0.5).count();
        assert!((4780..=4820).contains(&loud), "loud frames: {loud}");
        // Nothing but the tone sits at the start of the output
        assert!(out[..2000].iter().all(|s| s.abs() < 0.01));
    }

    #[test]
    fn test_flush_without_input_is_empty() {
        let mut converter = RateConverter::new(22050, 48000, 1).expect("resampler");
        assert!(converter.flush().expect("flush").is_empty());
    }

    #[test]
    fn test_converter_passthrough_at_same_rate() {
        let mut converter = SampleConverter::new(48000, 1, 48000, 2).expect("converter");
        assert_eq!(converter.process(&[0.5]).expect("process"), vec![0.5, 0.5]);
        assert!(converter.flush().expect("flush").is_empty());
    }
}
