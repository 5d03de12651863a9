// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;

use crate::MAX_BLOCK_SIZE;

/// Planar channel x sample buffer handed through the block pipeline.
///
/// Storage is allocated once at construction; `set_len` only moves the active
/// window, so the audio thread can reuse the same buffer for blocks of any
/// size up to the capacity.
#[derive(Debug, Default, Clone)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    len: usize,
}

impl AudioBuffer {
    pub fn new(num_channels: usize, capacity: usize) -> Self {
        Self {
            channels: vec![vec![0.0; capacity]; num_channels],
            len: capacity,
        }
    }

    /// Stereo buffer sized for the largest supported block.
    pub fn stereo() -> Self {
        Self::new(2, MAX_BLOCK_SIZE)
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Active block length in samples.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Set the active block length, clamped to the allocated capacity.
    pub fn set_len(&mut self, len: usize) {
        self.len = len.min(self.capacity());
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index][..self.len]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        let len = self.len;
        &mut self.channels[index][..len]
    }

    /// First two channels mutably at once (left, right).
    pub fn stereo_mut(&mut self) -> Option<(&mut [f32], &mut [f32])> {
        let len = self.len;
        match self.channels.as_mut_slice() {
            [left, right, ..] => Some((&mut left[..len], &mut right[..len])),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        let len = self.len;
        for channel in &mut self.channels {
            channel[..len].fill(0.0);
        }
    }

    pub fn clear_channel(&mut self, index: usize) {
        self.channel_mut(index).fill(0.0);
    }

    /// Add `value` at `index` in every channel.
    #[inline]
    pub fn add_to_all(&mut self, index: usize, value: f32) {
        for channel in &mut self.channels {
            channel[index] += value;
        }
    }

    pub fn apply_gain(&mut self, gain: f32) {
        let len = self.len;
        for channel in &mut self.channels {
            for sample in &mut channel[..len] {
                *sample *= gain;
            }
        }
    }

    /// Interleave the active window into `out` (frames x channels).
    ///
    /// Output channels beyond the buffer's own repeat the last channel, so a
    /// mono buffer fills every device channel.
    pub fn write_interleaved(&self, out: &mut [f32], out_channels: usize) {
        if self.channels.is_empty() || out_channels == 0 {
            out.fill(0.0);
            return;
        }
        let last = self.channels.len() - 1;
        for (frame, chunk) in out.chunks_mut(out_channels).take(self.len).enumerate() {
            for (ch, slot) in chunk.iter_mut().enumerate() {
                *slot = self.channels[ch.min(last)][frame];
            }
        }
    }
}
