//! Audio output using cpal and ring buffers
//!
//! Each producer thread owns the write side of its own ring. The device
//! callback drains both, mixes them and fills any shortfall with silence.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use ringbuf::traits::{Consumer, Split};
use ringbuf::{HeapCons, HeapRb};

use super::engine::AudioError;
use super::sink::RingSink;

/// Ring length in seconds of stereo audio
const RING_SECONDS: f32 = 0.1;

/// Live device stream; dropping it stops playback
pub struct AudioOutput {
    _stream: cpal::Stream,
    sample_rate: u32,
}

impl AudioOutput {
    /// Open the default device and return sinks for the music and effect producers
    pub fn open(running: Arc<AtomicBool>) -> Result<(Self, RingSink, RingSink), AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::Device(format!("failed to get default output config: {e}")))?;

        let sample_rate = supported.sample_rate().0;
        let ring_len = ((sample_rate as f32 * RING_SECONDS) as usize * 2).max(2048);
        let (music_prod, music_cons) = HeapRb::<f32>::new(ring_len).split();
        let (fx_prod, fx_cons) = HeapRb::<f32>::new(ring_len).split();

        let config: cpal::StreamConfig = supported.config();
        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, music_cons, fx_cons)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, music_cons, fx_cons)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, music_cons, fx_cons)?,
            other => {
                return Err(AudioError::Device(format!(
                    "unsupported sample format: {other:?}"
                )));
            }
        };
        stream
            .play()
            .map_err(|e| AudioError::Device(format!("failed to play audio stream: {e}")))?;

        log::info!(
            "Audio device opened at {} Hz, {} channels",
            sample_rate,
            config.channels
        );

        Ok((
            Self {
                _stream: stream,
                sample_rate,
            },
            RingSink::new(music_prod, running.clone()),
            RingSink::new(fx_prod, running),
        ))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut music: HeapCons<f32>,
    mut effects: HeapCons<f32>,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    let mut music_buf: Vec<f32> = Vec::with_capacity(4096);
    let mut fx_buf: Vec<f32> = Vec::with_capacity(4096);

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let frames = data.len() / channels;
                music_buf.resize(frames * 2, 0.0);
                fx_buf.resize(frames * 2, 0.0);

                let popped = music.pop_slice(&mut music_buf);
                music_buf[popped..].fill(0.0);
                let popped = effects.pop_slice(&mut fx_buf);
                fx_buf[popped..].fill(0.0);

                for (i, frame) in data.chunks_exact_mut(channels).enumerate() {
                    let left = (music_buf[2 * i] + fx_buf[2 * i]).clamp(-1.0, 1.0);
                    let right = (music_buf[2 * i + 1] + fx_buf[2 * i + 1]).clamp(-1.0, 1.0);
                    for (c, out) in frame.iter_mut().enumerate() {
                        let s = match c {
                            0 if channels == 1 => (left + right) * 0.5,
                            0 => left,
                            1 => right,
                            _ => 0.0,
                        };
                        *out = T::from_sample(s);
                    }
                }
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::Device(format!("failed to build audio stream: {e}")))
}
