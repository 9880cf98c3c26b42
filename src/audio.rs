/*
 * @file audio.rs
 * @brief Microphone capture and WAV helpers for NutriGuide
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Audio recording and level analysis.
//!
//! This module handles microphone input recording using CPAL and in-memory
//! WAV encoding for the transcription backend.

use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig, StreamError};
use hound::{WavSpec, WavWriter};
use tracing::warn;

use crate::error::VoiceError;

/// Sample rate for audio recording (16kHz).
///
/// Value is expressed in Hertz and matches Whisper's preferred input rate.
pub const SAMPLE_RATE: u32 = 16000;

/// Number of audio channels (mono).
const CHANNELS: u16 = 1;

/// Bits per sample for WAV encoding.
const BITS_PER_SAMPLE: u16 = 16;

/// Lowest RMS amplitude ever considered speech.
///
/// Values much above ~300 miss normal speaking levels on some microphones.
const SILENCE_RMS_THRESHOLD: f32 = 150.0;

/// How far above the calibrated room noise speech must rise.
const AMBIENT_MULTIPLIER: f32 = 1.5;

/// Source of mono 16 kHz PCM audio.
///
/// Implementations acquire the device for the duration of one call and
/// release it before returning, on success and on error alike.
pub trait AudioInput: Send + Sync {
    fn record(&self, duration: Duration) -> Result<Vec<i16>, VoiceError>;
}

/// The system default microphone via CPAL.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpalInput;

impl AudioInput for CpalInput {
    /// Records audio from the default input device for a fixed duration.
    ///
    /// # Errors
    /// Returns [`VoiceError::Device`] if no input device is available or the
    /// stream cannot be built or started.
    fn record(&self, duration: Duration) -> Result<Vec<i16>, VoiceError> {
        let device = default_input_device()?;
        let samples = shared_samples();
        let stream = build_input_stream(&device, &input_config(), samples.clone())?;
        stream
            .play()
            .map_err(|err| VoiceError::Device(err.to_string()))?;
        std::thread::sleep(duration);
        // Dropping the stream releases the device before the buffer is read.
        drop(stream);
        let captured = samples
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| VoiceError::Device("sample buffer poisoned".to_string()))?;
        Ok(captured)
    }
}

/// Root-mean-square amplitude of a PCM buffer; zero for an empty buffer.
pub fn rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let energy = samples
        .iter()
        .map(|sample| (*sample as f32).powi(2))
        .sum::<f32>()
        / samples.len() as f32;
    energy.sqrt()
}

/// Speech threshold derived from a calibration recording's RMS.
pub fn speech_threshold(ambient_rms: f32) -> f32 {
    (ambient_rms * AMBIENT_MULTIPLIER).max(SILENCE_RMS_THRESHOLD)
}

/// Whether a recording rises above `threshold`.
pub fn contains_speech(samples: &[i16], threshold: f32) -> bool {
    !samples.is_empty() && rms(samples) >= threshold
}

/// Encodes samples as a 16-bit mono WAV file in memory.
///
/// # Errors
/// Returns [`VoiceError::Encoding`] if the WAV writer fails.
pub fn encode_wav(samples: &[i16]) -> Result<Vec<u8>, VoiceError> {
    let spec = WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut buffer, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(buffer.into_inner())
}

fn default_input_device() -> Result<Device, VoiceError> {
    cpal::default_host()
        .default_input_device()
        .ok_or_else(|| VoiceError::Device("no input device".to_string()))
}

fn input_config() -> StreamConfig {
    StreamConfig {
        channels: CHANNELS,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    }
}

fn shared_samples() -> Arc<Mutex<Vec<i16>>> {
    Arc::new(Mutex::new(Vec::new()))
}

fn build_input_stream(
    device: &Device,
    config: &StreamConfig,
    samples: Arc<Mutex<Vec<i16>>>,
) -> Result<Stream, VoiceError> {
    device
        .build_input_stream(
            config,
            move |data: &[f32], _: &_| push_samples(&samples, data),
            log_stream_error,
            None,
        )
        .map_err(|err| VoiceError::Device(err.to_string()))
}

/// Converts floating-point frames into 16-bit PCM and appends them to the buffer.
fn push_samples(buffer: &Arc<Mutex<Vec<i16>>>, data: &[f32]) {
    if let Ok(mut guard) = buffer.lock() {
        guard.extend(data.iter().map(|&sample| (sample * i16::MAX as f32) as i16));
    }
}

fn log_stream_error(error: StreamError) {
    warn!(%error, "audio stream error");
}
