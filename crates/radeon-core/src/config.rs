//! Device configuration.

use radeon_registers::common::FIFO_DEPTH;

/// Polls before a FIFO or idle wait is declared a hang.
pub const DEFAULT_FIFO_TIMEOUT: u32 = 10_000_000;

/// Per-device settings, fixed at attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Device address of byte 0 of local memory.
    pub fb_offset: u32,
    /// Device address of the auxiliary (AGP) aperture. Surfaces stored there
    /// are only accelerated when this is set.
    pub aux_offset: Option<u32>,
    /// Local-memory offset of a 32-byte area reserved for staging pixels.
    pub scratch_offset: u32,
    pub fifo_timeout: u32,
    /// FIFO entries reserved before polling the busy flag.
    pub idle_fifo_budget: u32,
    /// Vertices written per FIFO reservation.
    pub burst_vertices: usize,
    /// Byte-swap every register access.
    pub swap_bytes: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            fb_offset: 0,
            aux_offset: None,
            scratch_offset: 0,
            fifo_timeout: DEFAULT_FIFO_TIMEOUT,
            idle_fifo_budget: FIFO_DEPTH,
            burst_vertices: 8,
            swap_bytes: cfg!(target_endian = "big"),
        }
    }
}

impl DeviceConfig {
    /// FIFO entries per vertex burst for vertices of `stride` words, never
    /// more than the FIFO holds and never a partial vertex.
    #[must_use]
    pub fn burst_words(&self, stride: usize) -> usize {
        let max_vertices = FIFO_DEPTH as usize / stride;
        self.burst_vertices.clamp(1, max_vertices) * stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_is_clamped_to_fifo_depth() {
        let config = DeviceConfig {
            burst_vertices: 100,
            ..DeviceConfig::default()
        };
        assert_eq!(config.burst_words(6), 60);
        assert_eq!(config.burst_words(2), 64);
    }

    #[test]
    fn burst_never_drops_below_one_vertex() {
        let config = DeviceConfig {
            burst_vertices: 0,
            ..DeviceConfig::default()
        };
        assert_eq!(config.burst_words(4), 4);
    }
}
