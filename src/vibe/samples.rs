use super::error::{ModelError, Result};

/// One YUV colour sample
pub type Sample = [u8; 3];

/// Per-pixel colour samples in one contiguous arena.
///
/// Pixel `p` owns `slots[p * nsamples..(p + 1) * nsamples]`. Slot order carries
/// no meaning.
pub struct SampleStore {
    nsamples: usize,
    slots: Vec<Sample>,
}

impl SampleStore {
    pub(crate) fn new(pixels: usize, nsamples: usize) -> Result<Self> {
        let len = pixels
            .checked_mul(nsamples)
            .ok_or_else(|| ModelError::Configuration("sample count overflows".into()))?;

        Ok(Self {
            nsamples,
            slots: try_filled_vec(len, [0u8; 3], "sample store")?,
        })
    }

    pub fn nsamples(&self) -> usize {
        self.nsamples
    }

    /// Number of pixels covered
    pub fn len(&self) -> usize {
        self.slots.len() / self.nsamples
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn pixel(&self, p: usize) -> &[Sample] {
        let start = p * self.nsamples;
        &self.slots[start..start + self.nsamples]
    }

    #[inline]
    pub fn pixel_mut(&mut self, p: usize) -> &mut [Sample] {
        let start = p * self.nsamples;
        &mut self.slots[start..start + self.nsamples]
    }

    /// Channel-wise mean of pixel `p`'s samples
    pub fn mean(&self, p: usize) -> Sample {
        let mut sum = [0u32; 3];
        for sample in self.pixel(p) {
            for (acc, &c) in sum.iter_mut().zip(sample) {
                *acc += c as u32;
            }
        }
        let n = self.nsamples as u32;
        [(sum[0] / n) as u8, (sum[1] / n) as u8, (sum[2] / n) as u8]
    }
}

/// `vec![value; len]` that reports allocation failure instead of aborting.
pub(crate) fn try_filled_vec<T: Clone>(len: usize, value: T, what: &'static str) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| ModelError::Allocation {
        what,
        bytes: len.saturating_mul(std::mem::size_of::<T>()),
    })?;
    v.resize(len, value);
    Ok(v)
}
