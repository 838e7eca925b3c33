//! Device context: register access plus the mirror of programmed state.

use radeon_hal::{RegisterBus, VideoMemory};

use crate::config::DeviceConfig;
use crate::error::AccelError;
use crate::geometry::Region;
use crate::mmio::Mmio;
use crate::planar;
use crate::state::{BlittingFlags, DrawingFlags};
use crate::surface::{PixelFormat, Storage, Surface};
use crate::valid::ValidSet;
use crate::vertex::VertexLayout;

/// Everything a device needs from its platform.
pub trait Bus: RegisterBus + VideoMemory {}

impl<T: RegisterBus + VideoMemory> Bus for T {}

/// Programmed destination, in device addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DstState {
    pub format: PixelFormat,
    pub offset: u32,
    pub pitch: u32,
    pub cb_offset: u32,
    pub cr_offset: u32,
}

/// Programmed source, in device addresses, after field selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrcState {
    pub format: PixelFormat,
    pub offset: u32,
    pub pitch: u32,
    pub cb_offset: u32,
    pub cr_offset: u32,
    pub width: u32,
    pub height: u32,
    /// Sampled field when deinterlacing.
    pub field: Option<u32>,
    /// Point sampling (palette formats).
    pub nearest: bool,
}

/// Mirror of the values currently held by the engine registers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HwState {
    pub dst: Option<DstState>,
    pub src: Option<SrcState>,
    pub clip: Region,
    /// Constant colour per plane; only the first is used off planar targets.
    pub plane_colors: [u32; 3],
    /// Last pixel staged in the scratch area.
    pub scratch: Option<u32>,
    /// Fixed-function render backend enables (blend, ROP).
    pub rb3d_flags: u32,
    /// Blend factor fields of the blend control register.
    pub blend: u32,
    pub drawing_flags: DrawingFlags,
    pub blitting_flags: BlittingFlags,
    pub layout: Option<VertexLayout>,
}

impl HwState {
    /// Programmed destination. Programming anything else first is a bug.
    #[must_use]
    pub fn dst(&self) -> DstState {
        self.dst.unwrap_or_else(|| panic!("destination used before it was programmed"))
    }

    #[must_use]
    pub fn src(&self) -> SrcState {
        self.src.unwrap_or_else(|| panic!("source used before it was programmed"))
    }

    #[must_use]
    pub fn dst_format(&self) -> Option<PixelFormat> {
        self.dst.map(|d| d.format)
    }
}

pub struct Context<B> {
    pub mmio: Mmio<B>,
    pub hw: HwState,
    pub valid: ValidSet,
    pub config: DeviceConfig,
}

impl<B: Bus> Context<B> {
    pub fn new(bus: B, config: DeviceConfig) -> Self {
        Self {
            mmio: Mmio::new(bus, &config),
            hw: HwState::default(),
            valid: ValidSet::new(),
            config,
        }
    }

    /// Device address of a surface's first byte.
    #[must_use]
    pub fn address(&self, surface: &Surface) -> u32 {
        let base = match surface.storage {
            Storage::Video => self.config.fb_offset,
            Storage::Auxiliary => self
                .config
                .aux_offset
                .unwrap_or_else(|| panic!("auxiliary surface without an auxiliary aperture")),
        };
        base.wrapping_add(surface.offset)
    }

    #[must_use]
    pub fn resolve_destination(&self, surface: &Surface) -> DstState {
        let offset = self.address(surface);
        let (cb_offset, cr_offset) = planar::plane_offsets(surface.format, offset, surface.pitch, surface.height);
        DstState {
            format: surface.format,
            offset,
            pitch: surface.pitch,
            cb_offset,
            cr_offset,
        }
    }

    /// Source binding; a deinterlaced source addresses one field as a
    /// half-height image of doubled pitch.
    #[must_use]
    pub fn resolve_source(&self, surface: &Surface, deinterlace: bool) -> SrcState {
        let offset = self.address(surface);
        let (cb_offset, cr_offset) = planar::plane_offsets(surface.format, offset, surface.pitch, surface.height);
        let mut src = SrcState {
            format: surface.format,
            offset,
            pitch: surface.pitch,
            cb_offset,
            cr_offset,
            width: surface.width,
            height: surface.height,
            field: None,
            nearest: surface.format.is_indexed(),
        };
        if deinterlace {
            let field = surface.field;
            src.field = Some(field);
            src.offset += field * surface.pitch;
            if surface.format.is_planar() {
                src.cb_offset += field * surface.pitch / 2;
                src.cr_offset += field * surface.pitch / 2;
            }
            src.pitch *= 2;
            src.height /= 2;
        }
        src
    }

    /// Put `pixel` in the scratch area and return its device address.
    ///
    /// Waits for the engine to go idle first unless the area already holds
    /// that pixel, since queued primitives may still sample it.
    ///
    /// # Errors
    /// Propagates idle-wait failures.
    pub fn stage_pixel(&mut self, pixel: u32) -> Result<u32, AccelError> {
        if self.hw.scratch != Some(pixel) {
            self.mmio.idle_wait()?;
            self.mmio.bus_mut().write_vram32(self.config.scratch_offset, pixel);
            self.hw.scratch = Some(pixel);
        }
        Ok(self.config.fb_offset.wrapping_add(self.config.scratch_offset))
    }

    /// Forget the mirror and every valid bit.
    pub fn forget_state(&mut self) {
        self.hw = HwState::default();
        self.valid.clear();
    }
}
