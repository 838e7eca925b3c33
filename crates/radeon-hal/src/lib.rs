#![no_std]

use core::ptr::{read_volatile, write_volatile};

/// Abstracts 32-bit access to the engine register aperture.
///
/// Offsets are byte offsets from the aperture base. Values cross this
/// boundary exactly as the bus delivers them; byte-order correction is the
/// caller's job.
pub trait RegisterBus {
    /// Read a register.
    fn read32(&mut self, offset: u32) -> u32;

    /// Write a register. Implementations MUST NOT elide, merge or reorder
    /// writes.
    fn write32(&mut self, offset: u32, value: u32);
}

/// Abstracts CPU access to device-local memory.
///
/// Only used to stage single pixels the engine later samples as a texture.
pub trait VideoMemory {
    /// Store one 32-bit word at a byte offset into local memory.
    fn write_vram32(&mut self, offset: u32, value: u32);
}

/// Register and memory apertures mapped into the CPU address space.
#[derive(Debug)]
pub struct MappedAperture {
    mmio: *mut u32,
    mmio_len: usize,
    vram: *mut u32,
    vram_len: usize,
}

impl MappedAperture {
    /// Wrap already-mapped apertures.
    ///
    /// # Safety
    /// `mmio` and `vram` must be valid, 4-byte aligned, uncached mappings of
    /// at least `mmio_len` / `vram_len` bytes that stay mapped for the
    /// lifetime of the returned value, with no other writer.
    #[must_use]
    pub const unsafe fn new(mmio: *mut u32, mmio_len: usize, vram: *mut u32, vram_len: usize) -> Self {
        Self {
            mmio,
            mmio_len,
            vram,
            vram_len,
        }
    }

    fn slot(base: *mut u32, len: usize, offset: u32) -> *mut u32 {
        let offset = offset as usize;
        assert!(offset % 4 == 0 && offset + 4 <= len, "aperture access out of range: {offset:#x}");
        // SAFETY: bounds and alignment checked above against the mapping
        // size promised by `new`.
        unsafe { base.add(offset / 4) }
    }
}

impl RegisterBus for MappedAperture {
    fn read32(&mut self, offset: u32) -> u32 {
        let reg = Self::slot(self.mmio, self.mmio_len, offset);
        // SAFETY: `slot` returns an in-bounds, aligned register address.
        unsafe { read_volatile(reg) }
    }

    fn write32(&mut self, offset: u32, value: u32) {
        let reg = Self::slot(self.mmio, self.mmio_len, offset);
        // SAFETY: `slot` returns an in-bounds, aligned register address.
        unsafe { write_volatile(reg, value) }
    }
}

impl VideoMemory for MappedAperture {
    fn write_vram32(&mut self, offset: u32, value: u32) {
        let word = Self::slot(self.vram, self.vram_len, offset);
        // SAFETY: `slot` returns an in-bounds, aligned address in local memory.
        unsafe { write_volatile(word, value) }
    }
}
