//! Mock register bus shared by the integration tests.
//!
//! Records every register and video-memory write and models the command
//! FIFO: each queued write consumes a free entry, each status read drains
//! `fifo_step` entries. A write with no free entry sets `overflow`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use radeon_core::{DeviceConfig, Family, PixelFormat, Surface};
use radeon_hal::{RegisterBus, VideoMemory};
use radeon_registers::common::{FIFO_DEPTH, HOST_PATH_CNTL, RBBM_SOFT_RESET, RBBM_STATUS, SE_PORT_DATA0};

/// Captured register write: (offset, value).
pub type WriteRecord = (u32, u32);

#[derive(Debug)]
pub struct BusState {
    pub writes: Vec<WriteRecord>,
    pub regs: HashMap<u32, u32>,
    pub vram: HashMap<u32, u32>,
    /// Free FIFO entries.
    pub fifo_free: u32,
    /// Entries drained per status read.
    pub fifo_step: u32,
    /// Status reads left that report the engine busy.
    pub busy_reads: u32,
    /// Engine hung until the next soft reset: no entries free, always busy.
    pub hung: bool,
    pub overflow: bool,
    pub status_reads: u32,
}

#[derive(Clone)]
pub struct MockBus {
    pub state: Rc<RefCell<BusState>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(BusState {
                writes: Vec::new(),
                regs: HashMap::new(),
                vram: HashMap::new(),
                fifo_free: FIFO_DEPTH,
                fifo_step: FIFO_DEPTH,
                busy_reads: 0,
                hung: false,
                overflow: false,
                status_reads: 0,
            })),
        }
    }

    /// Preset a register value, e.g. before a snapshot is taken.
    pub fn set_reg(&self, offset: u32, value: u32) {
        self.state.borrow_mut().regs.insert(offset, value);
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.state.borrow().writes.clone()
    }

    /// Values written to `offset`, in order.
    pub fn writes_to(&self, offset: u32) -> Vec<u32> {
        self.state
            .borrow()
            .writes
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn last_write_to(&self, offset: u32) -> Option<u32> {
        self.state
            .borrow()
            .writes
            .iter()
            .rev()
            .find(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
    }

    pub fn count(&self, offset: u32) -> usize {
        self.writes_to(offset).len()
    }

    /// Forget recorded writes; register contents are kept.
    pub fn clear(&self) {
        self.state.borrow_mut().writes.clear();
    }

    /// Vertex words streamed through the vertex port.
    pub fn port_words(&self) -> Vec<f32> {
        self.writes_to(SE_PORT_DATA0).into_iter().map(f32::from_bits).collect()
    }

    pub fn overflowed(&self) -> bool {
        self.state.borrow().overflow
    }

    pub fn vram(&self, offset: u32) -> Option<u32> {
        self.state.borrow().vram.get(&offset).copied()
    }
}

impl RegisterBus for MockBus {
    fn read32(&mut self, offset: u32) -> u32 {
        let mut s = self.state.borrow_mut();
        if offset == RBBM_STATUS {
            s.status_reads += 1;
            if s.hung {
                return 0x8000_0000;
            }
            let free = s.fifo_free;
            s.fifo_free = (s.fifo_free + s.fifo_step).min(FIFO_DEPTH);
            let busy = if s.busy_reads > 0 {
                s.busy_reads -= 1;
                0x8000_0000
            } else {
                0
            };
            return free | busy;
        }
        s.regs.get(&offset).copied().unwrap_or(0)
    }

    fn write32(&mut self, offset: u32, value: u32) {
        let mut s = self.state.borrow_mut();
        s.writes.push((offset, value));
        s.regs.insert(offset, value);
        match offset {
            RBBM_SOFT_RESET => {
                if value != 0 {
                    s.hung = false;
                    s.fifo_free = FIFO_DEPTH;
                }
            }
            HOST_PATH_CNTL => {}
            _ => {
                if s.fifo_free == 0 {
                    s.overflow = true;
                } else {
                    s.fifo_free -= 1;
                }
            }
        }
    }
}

impl VideoMemory for MockBus {
    fn write_vram32(&mut self, offset: u32, value: u32) {
        self.state.borrow_mut().vram.insert(offset, value);
    }
}

pub fn config() -> DeviceConfig {
    DeviceConfig {
        scratch_offset: 0x0080_0000,
        fifo_timeout: 1000,
        ..DeviceConfig::default()
    }
}

/// 640x480 RGB16 surface at 0x10000 with a 1024-byte pitch.
pub fn rgb16_surface() -> Surface {
    Surface::new(PixelFormat::Rgb16, 640, 480, 0x10000, 1024)
}

pub fn surface(format: PixelFormat, width: u32, height: u32, offset: u32) -> Surface {
    let pitch = if format.is_planar() {
        width
    } else {
        width * format.bytes_per_pixel()
    };
    Surface::new(format, width, height, offset, pitch)
}

pub const FAMILIES: [Family; 3] = [Family::R100, Family::R200, Family::R300];
