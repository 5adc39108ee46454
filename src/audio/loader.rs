use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::audio::types::{AudioData, AudioFormat};
use crate::error::{AudioError, Result};

/// Audio file loader supporting multiple formats
pub struct AudioLoader;

impl AudioLoader {
    /// Load an audio file and return decoded audio data
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<AudioData> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|_| AudioError::LoadFailed {
            path: path.display().to_string(),
        })?;

        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio")
            .to_string();

        Self::load_bytes(&name, bytes)
    }

    /// Decode an in-memory audio file, dispatching on the extension of `name`
    pub fn load_bytes(name: &str, bytes: impl Into<Arc<[u8]>>) -> Result<AudioData> {
        let bytes = bytes.into();
        let extension = Self::detect_format(name).unwrap_or_default();

        match extension.as_str() {
            "wav" => Self::decode_wav(name, bytes),
            "mp3" | "flac" | "ogg" | "m4a" | "aac" => Self::decode_with_symphonia(name, &extension, bytes),
            _ => Err(AudioError::UnsupportedFormat {
                format: extension
            }.into()),
        }
    }

    /// Decode WAV data using the hound crate (most reliable for WAV)
    fn decode_wav(name: &str, bytes: Arc<[u8]>) -> Result<AudioData> {
        let decode_failed = |reason: String| AudioError::DecodeFailed {
            name: name.to_string(),
            reason,
        };

        let reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| decode_failed(e.to_string()))?;

        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| decode_failed(e.to_string()))?,
            hound::SampleFormat::Int => {
                let bit_depth = spec.bits_per_sample;
                reader
                    .into_samples::<i32>()
                    .map(|sample| sample.map(|s| Self::int_to_float(s, bit_depth)))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| decode_failed(e.to_string()))?
            }
        };

        Ok(AudioData::from_interleaved(
            name,
            samples,
            spec.sample_rate,
            spec.channels,
            AudioFormat {
                extension: "wav".to_string(),
                bit_depth: Some(spec.bits_per_sample),
                compression: None,
            },
        ))
    }

    /// Decode compressed formats using Symphonia
    fn decode_with_symphonia(name: &str, extension: &str, bytes: Arc<[u8]>) -> Result<AudioData> {
        let decode_failed = |reason: String| AudioError::DecodeFailed {
            name: name.to_string(),
            reason,
        };

        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        let mut hint = Hint::new();
        hint.with_extension(extension);

        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &fmt_opts, &meta_opts)
            .map_err(|e| decode_failed(e.to_string()))?;

        let mut format = probed.format;

        // Find the first audio track with a known (decodable) codec
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| decode_failed("no decodable audio track".to_string()))?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;
        let mut channels = track.codec_params.channels.map(|c| c.count() as u16);
        let bits_per_sample = track.codec_params.bits_per_sample;
        let codec_type = track.codec_params.codec;

        let dec_opts: DecoderOptions = Default::default();
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &dec_opts)
            .map_err(|e| decode_failed(e.to_string()))?;

        let mut samples = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                // End of stream
                Err(SymphoniaError::IoError(_)) => break,
                Err(e) => return Err(decode_failed(e.to_string()).into()),
            };

            while !format.metadata().is_latest() {
                format.metadata().pop();
            }

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate.get_or_insert(spec.rate);
                    channels.get_or_insert(spec.channels.count() as u16);

                    let buf = sample_buf.get_or_insert_with(|| {
                        SampleBuffer::<f32>::new(decoded.capacity() as u64, spec)
                    });
                    if buf.capacity() < decoded.capacity() * spec.channels.count() {
                        *buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                    }
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
                Err(SymphoniaError::IoError(_)) => break,
                Err(SymphoniaError::DecodeError(e)) => {
                    debug!("Skipping corrupt packet in {}: {}", name, e);
                    continue;
                }
                Err(e) => return Err(decode_failed(e.to_string()).into()),
            }
        }

        let (Some(sample_rate), Some(channels)) = (sample_rate, channels) else {
            return Err(decode_failed("missing sample rate or channel layout".to_string()).into());
        };

        if samples.is_empty() {
            return Err(decode_failed("stream contained no audio".to_string()).into());
        }

        Ok(AudioData::from_interleaved(
            name,
            samples,
            sample_rate,
            channels,
            AudioFormat {
                extension: extension.to_string(),
                bit_depth: bits_per_sample.map(|b| b as u16),
                compression: Some(format!("{:?}", codec_type)),
            },
        ))
    }

    /// Convert integer sample to float (-1.0 to 1.0)
    fn int_to_float(sample: i32, bit_depth: u16) -> f32 {
        match bit_depth {
            8 => (sample as f32 - 128.0) / 128.0,
            16 => sample as f32 / 32768.0,
            24 => sample as f32 / 8388608.0,
            32 => sample as f32 / 2147483648.0,
            _ => sample as f32 / 32768.0, // Default to 16-bit
        }
    }

    /// Detect audio format from file extension
    pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check if a file format is supported
    pub fn is_format_supported(extension: &str) -> bool {
        matches!(
            extension.to_lowercase().as_str(),
            "wav" | "mp3" | "flac" | "ogg" | "m4a" | "aac"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComposerError;
    use std::io::Write;
    use tempfile::tempdir;

    fn wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(AudioLoader::detect_format("test.wav"), Some("wav".to_string()));
        assert_eq!(AudioLoader::detect_format("test.MP3"), Some("mp3".to_string()));
        assert_eq!(AudioLoader::detect_format("test"), None);
    }

    #[test]
    fn test_format_support() {
        assert!(AudioLoader::is_format_supported("wav"));
        assert!(AudioLoader::is_format_supported("mp3"));
        assert!(AudioLoader::is_format_supported("FLAC"));
        assert!(!AudioLoader::is_format_supported("xyz"));
    }

    #[test]
    fn test_int_to_float_conversion() {
        assert_eq!(AudioLoader::int_to_float(0, 16), 0.0);
        assert_eq!(AudioLoader::int_to_float(32767, 16), 32767.0 / 32768.0);
        assert_eq!(AudioLoader::int_to_float(-32768, 16), -1.0);

        assert_eq!(AudioLoader::int_to_float(128, 8), 0.0);
        assert_eq!(AudioLoader::int_to_float(0, 8), -1.0);
    }

    #[test]
    fn test_decode_wav_from_memory() {
        let bytes = wav_bytes(&[0, 16384, -16384, 0], 8000, 2);
        let audio = AudioLoader::load_bytes("speech.wav", bytes).unwrap();

        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.frames(), 2);
        assert_eq!(audio.samples[1], 0.5);
        assert_eq!(audio.samples[2], -0.5);
        assert_eq!(audio.name, "speech.wav");
    }

    #[test]
    fn test_garbage_mp3_is_unsupported() {
        let result = AudioLoader::load_bytes("speech.mp3", b"this is plainly not audio".to_vec());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::UnsupportedAudioFormat);
    }

    #[tokio::test]
    async fn test_unsupported_format() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test.xyz");

        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(b"dummy content").unwrap();

        let result = AudioLoader::load(&file_path).await;

        if let Err(ComposerError::Audio(AudioError::UnsupportedFormat { format })) = result {
            assert_eq!(format, "xyz");
        } else {
            panic!("Expected UnsupportedFormat error");
        }
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = AudioLoader::load("/no/such/speech.mp3").await;
        assert!(matches!(result, Err(ComposerError::Audio(AudioError::LoadFailed { .. }))));
    }
}
