//! Per-generation state programmers.
//!
//! Each generation is a zero-sized type; a device is specialised on one of
//! them at attach, so no call re-checks which hardware it is driving.

use radeon_registers::Family;

use crate::color::Color;
use crate::context::{Bus, Context, DstState, SrcState};
use crate::emit::RectShape;
use crate::error::AccelError;
use crate::geometry::Region;
use crate::planar::Plane;
use crate::state::{BlendFactor, BlittingFlags, DrawingFlags};
use crate::vertex::{VertexBatch, VertexLayout};

pub mod common;
mod fixed;
mod r100;
mod r200;
mod r300;

pub use r100::R100;
pub use r200::R200;
pub use r300::R300;

/// Register programming for one engine generation.
///
/// Setters write the registers behind one aspect of the state and update the
/// mirror fields they own. The destination must be programmed before any
/// other aspect, the source before anything that reads it.
pub trait Generation {
    const FAMILY: Family;
    const RECT_SHAPE: RectShape;
    /// Source coordinates are sent in texels rather than normalized.
    const PIXEL_TEXCOORDS: bool;
    /// Registers captured at attach and restored at detach.
    const SAVED_REGISTERS: &'static [u32];

    /// Program documented defaults (and microcode) after an engine reset.
    fn restore<B: Bus>(ctx: &mut Context<B>) -> Result<(), AccelError>;

    fn set_destination<B: Bus>(ctx: &mut Context<B>, dst: &DstState) -> Result<(), AccelError>;

    fn set_source<B: Bus>(ctx: &mut Context<B>, src: &SrcState) -> Result<(), AccelError>;

    fn set_clip<B: Bus>(ctx: &mut Context<B>, clip: &Region) -> Result<(), AccelError>;

    fn set_drawing_color<B: Bus>(
        ctx: &mut Context<B>,
        color: Color,
        index: u8,
        flags: DrawingFlags,
    ) -> Result<(), AccelError>;

    fn set_blitting_color<B: Bus>(ctx: &mut Context<B>, color: Color, flags: BlittingFlags) -> Result<(), AccelError>;

    fn set_src_colorkey<B: Bus>(ctx: &mut Context<B>, key: u32) -> Result<(), AccelError>;

    fn set_blend_function<B: Bus>(ctx: &mut Context<B>, src: BlendFactor, dst: BlendFactor) -> Result<(), AccelError>;

    fn set_drawing_flags<B: Bus>(ctx: &mut Context<B>, flags: DrawingFlags) -> Result<(), AccelError>;

    fn set_blitting_flags<B: Bus>(
        ctx: &mut Context<B>,
        flags: BlittingFlags,
        layout: VertexLayout,
    ) -> Result<(), AccelError>;

    /// Point destination (and planar source) registers at one plane of a
    /// planar 4:2:0 surface.
    fn select_plane<B: Bus>(ctx: &mut Context<B>, plane: Plane) -> Result<(), AccelError>;

    fn emit<B: Bus>(ctx: &mut Context<B>, batch: &VertexBatch) -> Result<(), AccelError> {
        common::emit_batch(ctx, batch)
    }

    /// Close a group of primitives touching the destination.
    fn finish_group<B: Bus>(_ctx: &mut Context<B>) -> Result<(), AccelError> {
        Ok(())
    }

    /// Push queued rendering out to memory ahead of CPU access.
    fn emit_commands<B: Bus>(_ctx: &mut Context<B>) -> Result<(), AccelError> {
        Ok(())
    }
}
