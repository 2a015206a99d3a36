//! Pronunciation scoring heuristic.
//!
//! Approximates a score from two cheap signal features: loudness (mean
//! absolute amplitude) and rhythm (zero-crossing count). This is not a
//! phonetic analysis; it only needs to react plausibly to how much and how
//! actively the user spoke.

/// Score returned when no usable audio was captured.
const DEFAULT_SCORE: u8 = 60;

/// Scores a recording of little-endian PCM16 audio on a 0 to 100 scale.
///
/// Input that decodes to zero complete samples gets [`DEFAULT_SCORE`]. A
/// trailing odd byte is ignored.
pub fn pronunciation_score(audio: &[u8]) -> u8 {
    let samples: Vec<i16> = audio
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    if samples.is_empty() {
        return DEFAULT_SCORE;
    }

    let (energy, zero_crossings) = signal_features(&samples);
    let energy_score = (energy / 1000.0).min(100.0);
    let rhythm_score = (zero_crossings / 100.0).min(100.0);
    let final_score = (0.6 * energy_score + 0.4 * rhythm_score) as i64;
    final_score.clamp(0, 100) as u8
}

/// Mean absolute amplitude and sign-change count of the sample stream.
fn signal_features(samples: &[i16]) -> (f64, f64) {
    let energy =
        samples.iter().map(|&s| f64::from(s).abs()).sum::<f64>() / samples.len() as f64;
    let zero_crossings = samples
        .windows(2)
        .filter(|pair| (pair[0] < 0) != (pair[1] < 0))
        .count();
    (energy, zero_crossings as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn empty_audio_gets_the_default_score() {
        assert_eq!(pronunciation_score(&[]), 60);
    }

    #[test]
    fn a_lone_trailing_byte_gets_the_default_score() {
        assert_eq!(pronunciation_score(&[0x7f]), 60);
    }

    #[test]
    fn silence_scores_zero() {
        let audio = pcm_bytes(&[0; 200]);
        assert_eq!(pronunciation_score(&audio), 0);
    }

    #[test]
    fn features_of_a_constant_signal() {
        let (energy, zero_crossings) = signal_features(&[2000; 100]);
        assert_abs_diff_eq!(energy, 2000.0);
        assert_abs_diff_eq!(zero_crossings, 0.0);
    }

    #[test]
    fn features_of_an_alternating_signal() {
        let samples: Vec<i16> = (0..100)
            .map(|i| if i % 2 == 0 { 3000 } else { -3000 })
            .collect();
        let (energy, zero_crossings) = signal_features(&samples);
        assert_abs_diff_eq!(energy, 3000.0);
        // 99 adjacent pairs, every one a sign change.
        assert_abs_diff_eq!(zero_crossings, 99.0);
    }

    #[test]
    fn negative_extreme_does_not_overflow() {
        let (energy, _) = signal_features(&[i16::MIN, i16::MIN]);
        assert_abs_diff_eq!(energy, 32768.0);
    }

    #[test]
    fn loud_speech_scores_higher_than_quiet_speech() {
        let quiet = pcm_bytes(&[500; 400]);
        let loud = pcm_bytes(&[20000; 400]);
        assert!(pronunciation_score(&loud) > pronunciation_score(&quiet));
    }

    #[test]
    fn score_blends_energy_and_rhythm() {
        // Constant 2000: energy 2000 -> 2.0, no crossings.
        // 0.6 * 2.0 = 1.2, truncated to 1.
        let audio = pcm_bytes(&[2000; 100]);
        assert_eq!(pronunciation_score(&audio), 1);
    }

    #[test]
    fn rhythm_component_saturates() {
        // 20001 alternating samples: 20000 crossings -> 200.0 capped at 100.
        let samples: Vec<i16> = (0..20001)
            .map(|i| if i % 2 == 0 { 20000 } else { -20000 })
            .collect();
        let audio = pcm_bytes(&samples);
        // 0.6 * (20000/1000) + 0.4 * 100 = 12 + 40 = 52.
        assert_eq!(pronunciation_score(&audio), 52);
    }

    #[test]
    fn score_never_leaves_the_valid_range() {
        let max_loud: Vec<i16> = (0..1000)
            .map(|i| if i % 2 == 0 { i16::MAX } else { i16::MIN })
            .collect();
        let score = pronunciation_score(&pcm_bytes(&max_loud));
        assert!(score <= 100);
    }
}
