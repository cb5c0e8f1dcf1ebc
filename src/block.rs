//! Aligned, zero-filled byte storage.
//!
//! [`AlignedBlock`] over-allocates a `Vec<u8>` by `alignment - 1` bytes and
//! records the offset of the first aligned byte. The heap allocation never
//! moves, so the offset stays valid when the block itself is moved.
//! Dropping the block releases the memory.

use alloc::vec::Vec;
use core::fmt;

use crate::error::BitmapError;

/// Owned byte block whose first byte sits on an `alignment` boundary.
pub struct AlignedBlock {
    data: Vec<u8>,
    /// Byte offset from `data` start to the first aligned byte.
    offset: usize,
    len: usize,
    alignment: usize,
}

impl AlignedBlock {
    /// Allocate `len` zeroed bytes aligned to `alignment`.
    ///
    /// # Errors
    ///
    /// [`BitmapError::InvalidAlignment`] if `alignment` is not a power of two,
    /// [`BitmapError::OutOfMemory`] if the allocator refuses the request.
    pub fn allocate(len: usize, alignment: usize) -> Result<Self, BitmapError> {
        if !alignment.is_power_of_two() {
            return Err(BitmapError::InvalidAlignment(alignment));
        }
        let alloc_len = len
            .checked_add(alignment - 1)
            .ok_or(BitmapError::OutOfMemory { bytes: len })?;
        let mut data = Vec::new();
        data.try_reserve_exact(alloc_len)
            .map_err(|_| BitmapError::OutOfMemory { bytes: alloc_len })?;
        data.resize(alloc_len, 0);
        let offset = align_offset(data.as_ptr(), alignment);
        Ok(Self {
            data,
            offset,
            len,
            alignment,
        })
    }

    /// Usable length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the block holds no usable bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Alignment the block was allocated with.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Bytes held from the allocator, including alignment slack.
    #[inline]
    pub fn allocated_len(&self) -> usize {
        self.data.len()
    }

    /// Address of the first usable byte.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    /// The usable bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.offset..self.offset + self.len]
    }

    /// The usable bytes, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let offset = self.offset;
        &mut self.data[offset..offset + self.len]
    }

    /// Zero every usable byte.
    pub fn fill_zero(&mut self) {
        self.as_mut_slice().fill(0);
    }
}

impl fmt::Debug for AlignedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AlignedBlock({} bytes, align {})",
            self.len, self.alignment
        )
    }
}

/// Round `val` up to the next multiple of `align` (must be a power of 2).
const fn align_up(val: usize, align: usize) -> usize {
    (val + align - 1) & !(align - 1)
}

/// Compute the byte offset needed to align `ptr` to `align`.
fn align_offset(ptr: *const u8, align: usize) -> usize {
    let addr = ptr as usize;
    align_up(addr, align) - addr
}
