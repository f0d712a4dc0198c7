//! Aligned amplitude storage

use crate::error::{Result, StateError};
use num_complex::Complex64;
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

/// Alignment of every amplitude buffer (64 bytes, one AVX-512 register)
pub const BUFFER_ALIGNMENT: usize = 64;

/// Zero-initialized, 64-byte aligned buffer of complex amplitudes
///
/// # Example
///
/// ```
/// use qshard_state::AlignedBuffer;
///
/// let buf = AlignedBuffer::zeroed(8).unwrap();
/// assert_eq!(buf.len(), 8);
/// assert!(buf.is_aligned_to(64));
/// ```
pub struct AlignedBuffer {
    data: NonNull<Complex64>,
    len: usize,
    layout: Layout,
}

// The buffer uniquely owns its allocation.
unsafe impl Send for AlignedBuffer {}
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocate `len` zeroed amplitudes
    pub fn zeroed(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(StateError::InvalidDimension { dimension: 0 });
        }

        let size = len * std::mem::size_of::<Complex64>();
        let layout = Layout::from_size_align(size, BUFFER_ALIGNMENT)
            .map_err(|_| StateError::AllocationError { size })?;

        // Complex64 zero is the all-zero bit pattern.
        let ptr = unsafe { alloc_zeroed(layout) as *mut Complex64 };
        let data = NonNull::new(ptr).ok_or(StateError::AllocationError { size })?;

        Ok(Self { data, len, layout })
    }

    /// Allocate a buffer holding a copy of `values`
    pub fn from_slice(values: &[Complex64]) -> Result<Self> {
        let mut buffer = Self::zeroed(values.len())?;
        buffer.copy_from_slice(values);
        Ok(buffer)
    }

    /// Number of amplitudes
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; zero-length buffers cannot be constructed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Zero every amplitude
    pub fn fill_zero(&mut self) {
        unsafe { std::ptr::write_bytes(self.data.as_ptr(), 0, self.len) };
    }

    /// Check whether the start address is aligned to `bytes`
    #[inline]
    pub fn is_aligned_to(&self, bytes: usize) -> bool {
        (self.data.as_ptr() as usize) % bytes == 0
    }
}

impl Deref for AlignedBuffer {
    type Target = [Complex64];

    #[inline]
    fn deref(&self) -> &[Complex64] {
        unsafe { std::slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }
}

impl DerefMut for AlignedBuffer {
    #[inline]
    fn deref_mut(&mut self) -> &mut [Complex64] {
        unsafe { std::slice::from_raw_parts_mut(self.data.as_ptr(), self.len) }
    }
}

impl Clone for AlignedBuffer {
    fn clone(&self) -> Self {
        let layout = self.layout;
        let ptr = unsafe { std::alloc::alloc(layout) as *mut Complex64 };
        let Some(data) = NonNull::new(ptr) else {
            std::alloc::handle_alloc_error(layout);
        };
        unsafe { std::ptr::copy_nonoverlapping(self.data.as_ptr(), data.as_ptr(), self.len) };
        Self {
            data,
            len: self.len,
            layout,
        }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        unsafe { dealloc(self.data.as_ptr() as *mut u8, self.layout) };
    }
}

impl std::fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("alignment", &self.layout.align())
            .finish()
    }
}
