//! Caller-owned output buffers.
//!
//! Every rendering call returns a fresh [`PcmBuffer`]. Inside Rust it is an ordinary owned
//! value. At the C boundary it is converted with [`PcmBuffer::into_raw`] into a pointer the
//! host holds until it hands it back to [`release_raw`], the only function allowed to free it.
//!
//! The raw allocation carries its own sample count in a header placed just before the first
//! sample, so releasing needs nothing but the pointer.

use crate::error::{PetalCueError, Result};
use std::alloc::{self, Layout};
use std::ops::Deref;
use std::ptr;

const HEADER_SIZE: usize = std::mem::size_of::<usize>();

/// Interleaved stereo 16-bit PCM, left channel first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcmBuffer {
    samples: Vec<i16>,
}

impl PcmBuffer {
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Number of stereo sample frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    pub fn into_vec(self) -> Vec<i16> {
        self.samples
    }

    /// Little-endian byte image of the samples, as consumed by wave players.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples
            .iter()
            .flat_map(|sample| sample.to_le_bytes())
            .collect()
    }

    /// Moves the samples into a raw allocation owned by the caller.
    ///
    /// Returns a null pointer for an empty buffer. A non-null pointer must be passed to
    /// [`release_raw`] exactly once.
    pub fn into_raw(self) -> Result<(*mut i16, usize)> {
        let len = self.samples.len();
        if len == 0 {
            return Ok((ptr::null_mut(), 0));
        }

        let layout = raw_layout(len)?;
        // SAFETY: the layout has a non-zero size (header plus at least one sample) and is
        // aligned for `usize`, which also satisfies the alignment of `i16`.
        unsafe {
            let base = alloc::alloc(layout);
            if base.is_null() {
                alloc::handle_alloc_error(layout);
            }
            base.cast::<usize>().write(len);
            let data = base.add(HEADER_SIZE).cast::<i16>();
            ptr::copy_nonoverlapping(self.samples.as_ptr(), data, len);
            Ok((data, len))
        }
    }
}

impl Deref for PcmBuffer {
    type Target = [i16];

    fn deref(&self) -> &[i16] {
        &self.samples
    }
}

impl From<Vec<i16>> for PcmBuffer {
    fn from(samples: Vec<i16>) -> Self {
        Self::new(samples)
    }
}

/// Frees a pointer produced by [`PcmBuffer::into_raw`]. Null is a no-op.
///
/// # Safety
///
/// `data` must be null or a pointer returned by [`PcmBuffer::into_raw`] that has not been
/// released yet. Releasing twice, or releasing any other pointer, is undefined behavior.
pub unsafe fn release_raw(data: *mut i16) {
    if data.is_null() {
        return;
    }

    // SAFETY: per the contract, `data` sits `HEADER_SIZE` bytes after the start of an
    // allocation made by `into_raw`, whose first word is the sample count.
    unsafe {
        let base = data.cast::<u8>().sub(HEADER_SIZE);
        let len = base.cast::<usize>().read();
        if let Ok(layout) = raw_layout(len) {
            alloc::dealloc(base, layout);
        }
    }
}

fn raw_layout(len: usize) -> Result<Layout> {
    let bytes = len
        .checked_mul(std::mem::size_of::<i16>())
        .and_then(|bytes| bytes.checked_add(HEADER_SIZE))
        .ok_or_else(|| PetalCueError::InvalidInput(format!("Buffer of {} samples is too large", len)))?;

    Layout::from_size_align(bytes, std::mem::align_of::<usize>()).map_err(|e| {
        PetalCueError::InvalidInput(format!("Invalid layout for {} samples: {}", len, e))
    })
}
