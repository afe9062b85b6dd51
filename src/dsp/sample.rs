//! PCM sample model - the audio format descriptor and per-instant samples.

/// Immutable PCM format descriptor.
///
/// All derived fields are computed once in [`AudioFormat::new`] and never
/// change afterwards. Two formats are compatible only when every field
/// matches, which the `PartialEq` derive gives us directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Samples per second.
    pub sample_rate: u32,
    /// Bits in one channel value: 8, 16, 24 or 32.
    pub bits_per_sample: u16,
    /// Stored width of one channel value.
    pub bytes_per_sample: u16,
    /// Interleaved channels per sample.
    pub channel_count: u16,
    /// Largest representable channel value, `2^(bits-1) - 1`.
    pub max_sample_value: i32,
    /// Smallest representable channel value, `-max - 1`.
    pub min_sample_value: i32,
}

impl AudioFormat {
    pub fn new(sample_rate: u32, bits_per_sample: u16, channel_count: u16) -> Self {
        let max_sample_value = if bits_per_sample == 0 {
            0
        } else {
            ((1i64 << (bits_per_sample - 1)) - 1) as i32
        };
        AudioFormat {
            sample_rate,
            bits_per_sample,
            bytes_per_sample: bits_per_sample / 8,
            channel_count,
            max_sample_value,
            min_sample_value: -max_sample_value - 1,
        }
    }

    /// Peak amplitude for this format at the given volume percentage.
    ///
    /// The requested percent is floored at 100, so the returned peak never
    /// drops below full scale. Sub-100 attenuation is the job of
    /// [`change_volume`](crate::dsp::stream::change_volume), applied to a
    /// finished stream.
    pub fn peak_amplitude(&self, percent: f64) -> f64 {
        percent.abs().max(100.0) * 0.01 * self.max_sample_value as f64
    }

    /// Clamp a raw value into the representable sample range.
    pub fn clip(&self, value: i32) -> i32 {
        value.clamp(self.min_sample_value, self.max_sample_value)
    }

    /// Bytes in one full sample across all channels.
    pub fn frame_size(&self) -> usize {
        self.bytes_per_sample as usize * self.channel_count as usize
    }
}

/// Pack a signed value into `out` little-endian, truncated to `out.len()`
/// bytes.
pub fn pack_le(value: i32, out: &mut [u8]) {
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = (value >> (i * 8)) as u8;
    }
}

/// Unpack a little-endian signed value of `bytes.len()` width, sign-extending
/// into the full `i32`.
pub fn unpack_le(bytes: &[u8]) -> i32 {
    let mut word = [0u8; 4];
    word[..bytes.len()].copy_from_slice(bytes);
    // Fill the upper bytes when the stored sign bit is set.
    if bytes.len() < 4 && bytes.last().is_some_and(|b| b & 0x80 != 0) {
        for byte in word[bytes.len()..].iter_mut() {
            *byte = 0xFF;
        }
    }
    i32::from_le_bytes(word)
}

/// One time-instant of PCM audio across every channel of its format.
///
/// Channel values live in the packed byte buffer, so a sample is always
/// ready to be appended to a WAV data chunk as-is. Writes clip to the
/// format's range; reads recover the exact stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    format: AudioFormat,
    data: Vec<u8>,
}

impl Sample {
    /// Build a sample with `value` (clipped) written to every channel.
    pub fn new(format: AudioFormat, value: i32) -> Self {
        let mut sample = Sample {
            format,
            data: vec![0u8; format.frame_size()],
        };
        for channel in 0..format.channel_count as usize {
            sample.set_channel(channel, value);
        }
        sample
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    /// Raw channel-interleaved little-endian bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn slot(&self, channel: usize) -> std::ops::Range<usize> {
        let width = self.format.bytes_per_sample as usize;
        let start = channel * width;
        start..start + width
    }

    /// Clip `value` into range and pack it into the channel's byte slot.
    pub fn set_channel(&mut self, channel: usize, value: i32) {
        let clipped = self.format.clip(value);
        let slot = self.slot(channel);
        pack_le(clipped, &mut self.data[slot]);
    }

    /// Unpack the channel's exact signed value.
    pub fn get_channel(&self, channel: usize) -> i32 {
        unpack_le(&self.data[self.slot(channel)])
    }

    /// Every channel value, in channel order.
    pub fn channel_values(&self) -> Vec<i32> {
        (0..self.format.channel_count as usize)
            .map(|channel| self.get_channel(channel))
            .collect()
    }
}
