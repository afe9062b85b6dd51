//! Stream tools - volume scaling, concatenation, and weighted mixing over
//! finished sample streams.

use crate::error::StreamError;

use super::sample::{AudioFormat, Sample};

/// Rescale every channel of every sample by `ratio`: floor, then clip on
/// write.
fn scale_stream(stream: &mut [Sample], ratio: f64) {
    for sample in stream.iter_mut() {
        for channel in 0..sample.format().channel_count as usize {
            let scaled = (sample.get_channel(channel) as f64 * ratio).floor();
            sample.set_channel(channel, scaled as i32);
        }
    }
}

/// Rescale the stream to `percent` of its current level.
///
/// This is where real output gain happens; tone generation always renders at
/// full scale. Fails on an empty stream.
pub fn change_volume(stream: &mut [Sample], percent: f64) -> Result<(), StreamError> {
    if stream.is_empty() {
        return Err(StreamError::Empty { op: "change_volume" });
    }
    scale_stream(stream, percent * 0.01);
    Ok(())
}

/// Append streams onto `base`, optionally rescaling each appended stream to
/// a volume percent first.
///
/// Entries with no samples or a format differing from the base are skipped.
/// Fails on an empty base: there is no format to check entries against.
pub fn append_samples(
    base: &mut Vec<Sample>,
    entries: Vec<(Option<f64>, Vec<Sample>)>,
) -> Result<(), StreamError> {
    if base.is_empty() {
        return Err(StreamError::Empty { op: "append_samples" });
    }
    let base_format = *base[0].format();
    for (percent, mut stream) in entries {
        if stream.is_empty() || *stream[0].format() != base_format {
            continue;
        }
        if let Some(percent) = percent {
            scale_stream(&mut stream, percent * 0.01);
        }
        base.append(&mut stream);
    }
    Ok(())
}

/// Mix weighted streams into one stream as long as the longest survivor,
/// shorter streams contributing silence once exhausted.
///
/// Entries with a non-positive weight, no samples, or a format other than
/// `format` are dropped. Each survivor is rescaled to its share of the total
/// weight, summed per channel with clipping, and the finished mix is
/// rescaled to `output_percent` (capped at 100). With nothing left to mix
/// the result is the correctly sized, fully silent stream; mixing never
/// fails.
pub fn mix_streams(
    format: AudioFormat,
    output_percent: f64,
    entries: Vec<(f64, Vec<Sample>)>,
) -> Vec<Sample> {
    let output_percent = output_percent.abs().min(100.0);

    let mut longest = 0usize;
    let mut total_weight = 0.0f64;
    let mut survivors: Vec<(f64, Vec<Sample>)> = Vec::new();
    for (weight, stream) in entries {
        if weight <= 0.0 || stream.is_empty() || *stream[0].format() != format {
            continue;
        }
        total_weight += weight;
        longest = longest.max(stream.len());
        survivors.push((weight, stream));
    }

    let mut output = vec![Sample::new(format, 0); longest];
    if survivors.is_empty() {
        return output;
    }

    for (weight, mut stream) in survivors {
        scale_stream(&mut stream, weight / total_weight);
        for (index, sample) in stream.iter().enumerate() {
            for channel in 0..format.channel_count as usize {
                let sum = output[index].get_channel(channel) as i64
                    + sample.get_channel(channel) as i64;
                let clipped = sum.clamp(
                    format.min_sample_value as i64,
                    format.max_sample_value as i64,
                );
                output[index].set_channel(channel, clipped as i32);
            }
        }
    }

    scale_stream(&mut output, output_percent * 0.01);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt() -> AudioFormat {
        AudioFormat::new(8000, 16, 1)
    }

    fn stream_of(values: &[i32]) -> Vec<Sample> {
        values.iter().map(|&v| Sample::new(fmt(), v)).collect()
    }

    fn values_of(stream: &[Sample]) -> Vec<i32> {
        stream.iter().map(|s| s.get_channel(0)).collect()
    }

    #[test]
    fn change_volume_halves_with_floor() {
        let mut stream = stream_of(&[1000, -1000, 3, -3]);
        change_volume(&mut stream, 50.0).unwrap();
        // Floor rounds toward negative infinity on both sides of zero.
        assert_eq!(values_of(&stream), vec![500, -500, 1, -2]);
    }

    #[test]
    fn change_volume_zero_silences() {
        let mut stream = stream_of(&[1000, -1000]);
        change_volume(&mut stream, 0.0).unwrap();
        assert_eq!(values_of(&stream), vec![0, 0]);
    }

    #[test]
    fn change_volume_above_unity_clips() {
        let mut stream = stream_of(&[30000, -30000, 100]);
        change_volume(&mut stream, 200.0).unwrap();
        assert_eq!(values_of(&stream), vec![32767, -32768, 200]);
    }

    #[test]
    fn change_volume_rejects_empty_stream() {
        let mut stream: Vec<Sample> = Vec::new();
        let err = change_volume(&mut stream, 50.0).unwrap_err();
        assert!(matches!(err, StreamError::Empty { op: "change_volume" }));
    }

    #[test]
    fn append_concatenates_in_order() {
        let mut base = stream_of(&[1, 2]);
        append_samples(&mut base, vec![(None, stream_of(&[3, 4])), (None, stream_of(&[5]))])
            .unwrap();
        assert_eq!(values_of(&base), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn append_rescales_only_flagged_entries() {
        let mut base = stream_of(&[1000]);
        append_samples(
            &mut base,
            vec![(Some(50.0), stream_of(&[1000])), (None, stream_of(&[1000]))],
        )
        .unwrap();
        assert_eq!(values_of(&base), vec![1000, 500, 1000]);
    }

    #[test]
    fn append_skips_empty_and_mismatched_entries() {
        let other = AudioFormat::new(44100, 16, 1);
        let mut base = stream_of(&[7]);
        append_samples(
            &mut base,
            vec![
                (None, Vec::new()),
                (None, vec![Sample::new(other, 9)]),
                (None, stream_of(&[8])),
            ],
        )
        .unwrap();
        assert_eq!(values_of(&base), vec![7, 8]);
    }

    #[test]
    fn append_rejects_empty_base() {
        let mut base: Vec<Sample> = Vec::new();
        let err = append_samples(&mut base, vec![(None, stream_of(&[1]))]).unwrap_err();
        assert!(matches!(err, StreamError::Empty { op: "append_samples" }));
    }

    #[test]
    fn mix_of_identical_streams_is_near_identity() {
        let original = stream_of(&[1000, -1000, 333, -333, 32767, -32768]);
        let mixed = mix_streams(
            fmt(),
            100.0,
            vec![(1.0, original.clone()), (1.0, original.clone())],
        );
        assert_eq!(mixed.len(), original.len());
        for (index, (mixed, original)) in values_of(&mixed)
            .into_iter()
            .zip(values_of(&original))
            .enumerate()
        {
            // Two floors of v/2 can land one below v, never above.
            let diff = mixed - original;
            assert!((-1..=0).contains(&diff), "sample {index}: {mixed} vs {original}");
        }
    }

    #[test]
    fn mix_pads_short_streams_with_silence() {
        let long = stream_of(&[1000, 1000, 1000, 1000]);
        let short = stream_of(&[1000, 1000]);
        let mixed = mix_streams(fmt(), 100.0, vec![(1.0, long), (1.0, short)]);
        assert_eq!(mixed.len(), 4);
        let values = values_of(&mixed);
        // Both streams present, then only the long one's half share.
        assert_eq!(values[0], 1000);
        assert_eq!(values[3], 500);
    }

    #[test]
    fn mix_drops_invalid_entries() {
        let other = AudioFormat::new(44100, 16, 1);
        let mixed = mix_streams(
            fmt(),
            100.0,
            vec![
                (0.0, stream_of(&[1000])),
                (-1.0, stream_of(&[1000])),
                (1.0, Vec::new()),
                (1.0, vec![Sample::new(other, 1000)]),
                (1.0, stream_of(&[1000, 1000])),
            ],
        );
        // Only the last entry survives, with the full weight share.
        assert_eq!(values_of(&mixed), vec![1000, 1000]);
    }

    #[test]
    fn mix_with_nothing_to_mix_is_empty() {
        let mixed = mix_streams(fmt(), 100.0, vec![(0.0, stream_of(&[1])), (1.0, Vec::new())]);
        assert!(mixed.is_empty());
    }

    #[test]
    fn mix_applies_output_percent() {
        let mixed = mix_streams(fmt(), 50.0, vec![(1.0, stream_of(&[1000, -500]))]);
        assert_eq!(values_of(&mixed), vec![500, -250]);
    }

    #[test]
    fn mix_caps_output_percent() {
        let boosted = mix_streams(fmt(), 150.0, vec![(1.0, stream_of(&[1000, -500]))]);
        let full = mix_streams(fmt(), 100.0, vec![(1.0, stream_of(&[1000, -500]))]);
        assert_eq!(values_of(&boosted), values_of(&full));

        // change_volume carries no such cap.
        let mut stream = stream_of(&[1000, -500]);
        change_volume(&mut stream, 150.0).unwrap();
        assert_eq!(values_of(&stream), vec![1500, -750]);
    }

    #[test]
    fn mix_weights_set_relative_levels() {
        let loud = stream_of(&[3000]);
        let quiet = stream_of(&[3000]);
        let mixed = mix_streams(fmt(), 100.0, vec![(3.0, loud), (1.0, quiet)]);
        // 3/4 of 3000 plus 1/4 of 3000 recombines to the original level.
        assert_eq!(values_of(&mixed), vec![3000]);
    }

    #[test]
    fn mix_clips_summed_floors_at_the_rails() {
        // Shares of -32768 at weights 1:2 floor to -10923 and -21846, one
        // below the rail in total; the sum must clamp back to min.
        let a = stream_of(&[-32768]);
        let b = stream_of(&[-32768]);
        let mixed = mix_streams(fmt(), 100.0, vec![(1.0, a), (2.0, b)]);
        assert_eq!(values_of(&mixed), vec![-32768]);
    }
}
