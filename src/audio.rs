//! WAV decoding for uploaded call recordings.
//!
//! Call audio arrives as an in-memory WAV upload. The speech contract
//! expects PCM mono, 16 kHz, 16-bit samples, so decoding validates those
//! assumptions up front instead of letting the provider fail mid-session.

use crate::error::{Result, SamtalError};

/// Required sample rate for the speech provider, in Hz.
pub const REQUIRED_SAMPLE_RATE: u32 = 16_000;
/// Required channel count (mono).
pub const REQUIRED_CHANNELS: u16 = 1;
/// Required sample width in bits.
pub const REQUIRED_BITS_PER_SAMPLE: u16 = 16;

/// PCM audio decoded from a WAV upload.
#[derive(Debug, Clone)]
pub struct PcmAudio {
    /// Raw little-endian PCM sample bytes.
    pub samples: Vec<u8>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels.
    pub channels: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

impl PcmAudio {
    /// Decode a WAV byte stream, validating the RIFF layout and the
    /// PCM/mono/16 kHz/16-bit assumptions.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(SamtalError::Audio(
                "not a RIFF/WAVE stream".to_string(),
            ));
        }

        let mut fmt: Option<(u16, u16, u32, u16)> = None;
        let mut data: Option<Vec<u8>> = None;

        // Walk the chunk list; chunks are 4-byte id + 4-byte LE size.
        let mut offset = 12;
        while offset + 8 <= bytes.len() {
            let chunk_id = &bytes[offset..offset + 4];
            let chunk_size = u32::from_le_bytes(
                bytes[offset + 4..offset + 8]
                    .try_into()
                    .map_err(|_| SamtalError::Audio("truncated chunk header".to_string()))?,
            ) as usize;
            let body_start = offset + 8;
            let body_end = body_start + chunk_size;
            if body_end > bytes.len() {
                return Err(SamtalError::Audio("truncated chunk body".to_string()));
            }
            let body = &bytes[body_start..body_end];

            match chunk_id {
                b"fmt " => {
                    if body.len() < 16 {
                        return Err(SamtalError::Audio("fmt chunk too short".to_string()));
                    }
                    let audio_format = u16::from_le_bytes([body[0], body[1]]);
                    let channels = u16::from_le_bytes([body[2], body[3]]);
                    let sample_rate = u32::from_le_bytes([body[4], body[5], body[6], body[7]]);
                    let bits_per_sample = u16::from_le_bytes([body[14], body[15]]);
                    fmt = Some((audio_format, channels, sample_rate, bits_per_sample));
                }
                b"data" => {
                    data = Some(body.to_vec());
                }
                _ => {}
            }

            // Chunk bodies are word-aligned.
            offset = body_end + (chunk_size % 2);
        }

        let (audio_format, channels, sample_rate, bits_per_sample) = fmt
            .ok_or_else(|| SamtalError::Audio("missing fmt chunk".to_string()))?;
        let samples = data.ok_or_else(|| SamtalError::Audio("missing data chunk".to_string()))?;

        if audio_format != 1 {
            return Err(SamtalError::Audio(format!(
                "expected PCM (format 1), got format {}",
                audio_format
            )));
        }
        if channels != REQUIRED_CHANNELS
            || sample_rate != REQUIRED_SAMPLE_RATE
            || bits_per_sample != REQUIRED_BITS_PER_SAMPLE
        {
            return Err(SamtalError::Audio(format!(
                "expected mono {} Hz {}-bit audio, got {} channel(s) at {} Hz {}-bit",
                REQUIRED_SAMPLE_RATE,
                REQUIRED_BITS_PER_SAMPLE,
                channels,
                sample_rate,
                bits_per_sample
            )));
        }

        Ok(Self {
            samples,
            sample_rate,
            channels,
            bits_per_sample,
        })
    }

    /// Duration of the audio in seconds.
    pub fn duration_seconds(&self) -> f64 {
        let bytes_per_second =
            self.sample_rate as f64 * self.channels as f64 * (self.bits_per_sample as f64 / 8.0);
        if bytes_per_second == 0.0 {
            return 0.0;
        }
        self.samples.len() as f64 / bytes_per_second
    }

    /// Re-encode as a minimal WAV byte stream for providers that take
    /// whole files rather than sample streams.
    pub fn to_wav_bytes(&self) -> Vec<u8> {
        let byte_rate =
            self.sample_rate * self.channels as u32 * (self.bits_per_sample as u32 / 8);
        let block_align = self.channels * (self.bits_per_sample / 8);
        let data_len = self.samples.len() as u32;

        let mut out = Vec::with_capacity(44 + self.samples.len());
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        out.extend_from_slice(&self.samples);
        out
    }
}
