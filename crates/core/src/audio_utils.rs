use base64::Engine;
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

/// Sample rate voice clips are normalised to before upload.
pub const VOICE_SAMPLE_RATE: u32 = 16000;
/// MIME type of clips produced by [`encode_wav_pcm16`].
pub const WAV_MIME_TYPE: &str = "audio/wav";

const RESAMPLER_CHUNK_SIZE: usize = 1024;

/// Creates a resampler to convert between audio sample rates.
pub fn create_resampler(
    in_sampling_rate: f64,
    out_sampling_rate: f64,
    chunk_size: usize,
) -> anyhow::Result<FastFixedIn<f32>> {
    let resampler = FastFixedIn::<f32>::new(
        out_sampling_rate / in_sampling_rate,
        1.0,
        PolynomialDegree::Cubic,
        chunk_size,
        1, // mono
    )?;
    Ok(resampler)
}

/// Resamples a whole mono clip, flushing the final partial chunk.
pub fn resample_mono(samples: &[f32], from_rate: u32, to_rate: u32) -> anyhow::Result<Vec<f32>> {
    if samples.is_empty() || from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let mut resampler = create_resampler(from_rate as f64, to_rate as f64, RESAMPLER_CHUNK_SIZE)?;
    let mut output =
        Vec::with_capacity(samples.len() * to_rate as usize / from_rate as usize + RESAMPLER_CHUNK_SIZE);
    let mut remaining = samples;

    loop {
        let needed = resampler.input_frames_next();
        if remaining.len() < needed {
            break;
        }
        let (chunk, rest) = remaining.split_at(needed);
        let input = [chunk];
        let resampled = resampler.process(&input[..], None)?;
        output.extend_from_slice(&resampled[0]);
        remaining = rest;
    }

    if !remaining.is_empty() {
        let input = [remaining];
        let resampled = resampler.process_partial(Some(&input[..]), None)?;
        output.extend_from_slice(&resampled[0]);
    }

    Ok(output)
}

/// Averages interleaved multi-channel frames down to a single channel.
pub fn downmix_to_mono(interleaved: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => interleaved.to_vec(),
        n => interleaved
            .chunks_exact(n as usize)
            .map(|frame| frame.iter().sum::<f32>() / n as f32)
            .collect(),
    }
}

/// Converts a slice of f32 samples to a vector of i16 samples.
pub fn convert_f32_to_i16(pcm32: &[f32]) -> Vec<i16> {
    pcm32
        .iter()
        .map(|&sample| (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16)
        .collect()
}

/// Converts a slice of i16 samples to a vector of f32 samples.
pub fn convert_i16_to_f32(pcm16: &[i16]) -> Vec<f32> {
    pcm16
        .iter()
        .map(|&sample| sample as f32 / 32768.0)
        .collect()
}

/// Wraps mono PCM16 samples in a canonical 44-byte RIFF/WAVE header.
pub fn encode_wav_pcm16(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    const CHANNELS: u16 = 1;
    const BITS_PER_SAMPLE: u16 = 16;
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * block_align as u32;
    let data_len = (samples.len() * 2) as u32;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&CHANNELS.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        wav.extend_from_slice(&sample.to_le_bytes());
    }
    wav
}

/// Resamples a captured mono clip to [`VOICE_SAMPLE_RATE`] and encodes it as WAV.
pub fn encode_voice_clip(samples: &[f32], sample_rate: u32) -> anyhow::Result<Vec<u8>> {
    let resampled = resample_mono(samples, sample_rate, VOICE_SAMPLE_RATE)?;
    Ok(encode_wav_pcm16(
        &convert_f32_to_i16(&resampled),
        VOICE_SAMPLE_RATE,
    ))
}

pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_create_resampler() {
        assert!(create_resampler(48000.0, 16000.0, 1024).is_ok());
        assert!(create_resampler(16000.0, 16000.0, 1024).is_ok());
    }

    #[test]
    fn test_resample_mono_length() {
        let input = vec![0.25f32; 48000];
        let output = resample_mono(&input, 48000, 16000).unwrap();
        let expected = 16000.0;
        assert!((output.len() as f64 - expected).abs() < expected * 0.1);

        let same = resample_mono(&input[..10], 16000, 16000).unwrap();
        assert_eq!(same, input[..10].to_vec());

        assert!(resample_mono(&[], 44100, 16000).unwrap().is_empty());
    }

    #[test]
    fn test_downmix_to_mono() {
        let stereo = [1.0f32, 0.0, 0.5, 0.5, -1.0, 1.0];
        assert_eq!(downmix_to_mono(&stereo, 2), vec![0.5, 0.5, 0.0]);
        assert_eq!(downmix_to_mono(&stereo, 1), stereo.to_vec());
        assert!(downmix_to_mono(&stereo, 0).is_empty());
    }

    #[test]
    fn test_convert_f32_to_i16() {
        let input = vec![1.0f32, -1.0f32, 0.0f32, 2.0f32, -2.0f32];
        let result = convert_f32_to_i16(&input);
        assert_eq!(result, vec![i16::MAX, -32767, 0, i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_convert_i16_to_f32() {
        let result = convert_i16_to_f32(&[i16::MIN, 0, 16384]);
        assert_abs_diff_eq!(result[0], -1.0, epsilon = 0.0001);
        assert_abs_diff_eq!(result[1], 0.0, epsilon = 0.0001);
        assert_abs_diff_eq!(result[2], 0.5, epsilon = 0.0001);
    }

    #[test]
    fn test_encode_wav_header() {
        let wav = encode_wav_pcm16(&[1, -1, 256], 16000);
        assert_eq!(wav.len(), 44 + 6);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 36 + 6);
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 1);
        assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), 16000);
        assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), 32000);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 6);
        assert_eq!(&wav[44..46], &1i16.to_le_bytes());
    }

    #[test]
    fn test_encode_voice_clip_is_16k_wav() {
        let clip = encode_voice_clip(&vec![0.0f32; 4410], 44100).unwrap();
        assert_eq!(&clip[0..4], b"RIFF");
        assert_eq!(
            u32::from_le_bytes(clip[24..28].try_into().unwrap()),
            VOICE_SAMPLE_RATE
        );
    }
}
