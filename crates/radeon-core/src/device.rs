//! Device lifecycle and the accelerated entry points.
//!
//! The host drives a device in a fixed rhythm: [`Device::check_state`] to
//! decide what can be accelerated, [`Device::set_state`] once per state
//! change, then any number of primitive calls of that operation. Primitives
//! return `Ok(false)` when the state was never programmed for them, which
//! the host treats as "fall back to software".

use std::marker::PhantomData;

use radeon_registers::Family;

use crate::caps::{self, Capability};
use crate::config::DeviceConfig;
use crate::context::{Bus, Context, HwState};
use crate::emit;
use crate::error::AccelError;
use crate::gen::{common, Generation, R100, R200, R300};
use crate::geometry::{Rectangle, Region, Triangle, TriangleFormation, Vertex};
use crate::mmio::{FifoStats, Snapshot};
use crate::planar;
use crate::state::{Accel, BlittingFlags, Category, DrawingFlags, Modified, OperationState};
use crate::valid::Aspect;
use crate::vertex::{VertexBatch, VertexLayout};

/// Vertices one primitive header can announce.
pub const MAX_VERTICES: usize = u16::MAX as usize;

pub struct Device<B, G> {
    ctx: Context<B>,
    snapshot: Snapshot,
    _generation: PhantomData<G>,
}

impl<B: Bus, G: Generation> Device<B, G> {
    /// Take over the engine: save the registers it will clobber, reset it and
    /// program the generation defaults.
    ///
    /// # Errors
    /// Fails if the engine hangs while the defaults are programmed.
    pub fn attach(bus: B, config: DeviceConfig) -> Result<Self, AccelError> {
        let mut ctx = Context::new(bus, config);
        let snapshot = ctx.mmio.snapshot(G::SAVED_REGISTERS);
        ctx.mmio.reset();
        G::restore(&mut ctx)?;
        log::info!("{:?} attached, {} registers saved", G::FAMILY, snapshot.len());
        Ok(Self {
            ctx,
            snapshot,
            _generation: PhantomData,
        })
    }

    /// Idle the engine, put the saved registers back and return the bus.
    pub fn detach(mut self) -> B {
        if let Err(err) = self.ctx.mmio.idle_wait() {
            log::error!("engine busy at detach: {err}");
        }
        if let Err(err) = self.ctx.mmio.restore(&self.snapshot) {
            log::error!("register restore failed: {err}");
        }
        let stats = self.ctx.mmio.stats();
        log::info!(
            "{:?} detached: {} reservations, {} cache hits, {} wait cycles, {} resets",
            G::FAMILY,
            stats.reserve_calls,
            stats.cache_hits,
            stats.wait_cycles,
            stats.resets
        );
        self.ctx.mmio.into_bus()
    }

    #[must_use]
    pub fn family(&self) -> Family {
        G::FAMILY
    }

    /// What can be accelerated for `accel` under `state`.
    #[must_use]
    pub fn check_state(&self, state: &OperationState, accel: Accel) -> Capability {
        caps::negotiate(G::FAMILY, &self.ctx.config, state, accel)
    }

    /// Program every stale aspect `accel` depends on and clear
    /// `state.modified`.
    ///
    /// The state must have passed [`Device::check_state`] for `accel`.
    ///
    /// # Errors
    /// A hang while programming; the engine has been reset and every aspect
    /// is invalid again.
    pub fn set_state(&mut self, state: &mut OperationState, accel: Accel) -> Result<(), AccelError> {
        self.ctx.valid.apply_modified(state.modified);
        state.modified = Modified::empty();
        self.ctx.valid.enter_category(accel.category());
        self.drop_stale_aspects(state, accel.category());

        let result = match accel.category() {
            Category::Drawing => self.program_drawing(state),
            Category::Blitting => self.program_blitting(state, accel),
        };
        result.inspect_err(|err| self.recover(*err))
    }

    /// Invalidate aspects whose mirrored registers no longer match `state`,
    /// whether or not the host flagged them as modified.
    fn drop_stale_aspects(&mut self, state: &OperationState, category: Category) {
        let ctx = &mut self.ctx;
        if ctx.hw.dst != Some(ctx.resolve_destination(&state.destination)) {
            ctx.valid.invalidate(Aspect::Destination);
        }
        if ctx.hw.clip != state.clip {
            ctx.valid.invalidate(Aspect::Clip);
        }
        match category {
            Category::Drawing => {
                if ctx.hw.drawing_flags != state.drawing_flags {
                    ctx.valid.apply_modified(Modified::DRAWING_FLAGS);
                }
            }
            Category::Blitting => {
                let flags = state.blitting_flags;
                if ctx.hw.blitting_flags != flags {
                    ctx.valid.apply_modified(Modified::BLITTING_FLAGS);
                }
                let deinterlace = flags.contains(BlittingFlags::DEINTERLACE);
                if let Some(surface) = &state.source {
                    if ctx.hw.src != Some(ctx.resolve_source(surface, deinterlace)) {
                        ctx.valid.invalidate(Aspect::Source);
                    }
                }
            }
        }
    }

    fn program_common(&mut self, state: &OperationState) -> Result<(), AccelError> {
        let ctx = &mut self.ctx;
        if !ctx.valid.is_valid(Aspect::Destination) {
            let dst = ctx.resolve_destination(&state.destination);
            if ctx.hw.dst != Some(dst) {
                if ctx.hw.dst_format() != Some(dst.format) {
                    ctx.valid.destination_format_changed();
                    // Source bindings depend on the destination format.
                    ctx.hw.src = None;
                }
                log::debug!("destination {:?} at {:#x} pitch {}", dst.format, dst.offset, dst.pitch);
                G::set_destination(ctx, &dst)?;
                ctx.hw.dst = Some(dst);
            }
            ctx.valid.set(Aspect::Destination);
        }
        if !ctx.valid.is_valid(Aspect::Clip) {
            G::set_clip(ctx, &state.clip)?;
            ctx.valid.set(Aspect::Clip);
        }
        Ok(())
    }

    fn program_blend(&mut self, state: &OperationState) -> Result<(), AccelError> {
        let ctx = &mut self.ctx;
        if !ctx.valid.all_valid(&[Aspect::SrcBlend, Aspect::DstBlend]) {
            G::set_blend_function(ctx, state.src_blend, state.dst_blend)?;
            ctx.valid.set(Aspect::SrcBlend);
            ctx.valid.set(Aspect::DstBlend);
        }
        Ok(())
    }

    fn program_drawing(&mut self, state: &OperationState) -> Result<(), AccelError> {
        self.program_common(state)?;
        if !self.ctx.valid.is_valid(Aspect::Color) {
            G::set_drawing_color(&mut self.ctx, state.color, state.color_index, state.drawing_flags)?;
            self.ctx.valid.set(Aspect::Color);
        }
        if state.drawing_flags.contains(DrawingFlags::BLEND) {
            self.program_blend(state)?;
        }
        if !self.ctx.valid.is_valid(Aspect::DrawingFlags) {
            G::set_drawing_flags(&mut self.ctx, state.drawing_flags)?;
            self.ctx.valid.set(Aspect::DrawingFlags);
        }
        Ok(())
    }

    fn program_blitting(&mut self, state: &OperationState, accel: Accel) -> Result<(), AccelError> {
        self.program_common(state)?;
        let flags = state.blitting_flags;
        let ctx = &mut self.ctx;

        if !ctx.valid.is_valid(Aspect::Source) {
            let surface = state
                .source
                .as_ref()
                .unwrap_or_else(|| panic!("blitting state without a source surface"));
            let src = ctx.resolve_source(surface, flags.contains(BlittingFlags::DEINTERLACE));
            if ctx.hw.src != Some(src) {
                if ctx.hw.src.map(|s| s.format) != Some(src.format) {
                    ctx.valid.source_format_changed();
                }
                log::debug!("source {:?} at {:#x} pitch {}", src.format, src.offset, src.pitch);
                G::set_source(ctx, &src)?;
                ctx.hw.src = Some(src);
            }
            ctx.valid.set(Aspect::Source);
        }
        if flags.intersects(BlittingFlags::USES_COLOR) && !ctx.valid.is_valid(Aspect::Color) {
            G::set_blitting_color(ctx, state.color, flags)?;
            ctx.valid.set(Aspect::Color);
        }
        if flags.contains(BlittingFlags::SRC_COLORKEY) && !ctx.valid.is_valid(Aspect::SrcColorkey) {
            G::set_src_colorkey(ctx, state.src_colorkey)?;
            ctx.valid.set(Aspect::SrcColorkey);
        }
        if flags.intersects(BlittingFlags::BLEND) {
            self.program_blend(state)?;
        }

        let ctx = &mut self.ctx;
        let layout = blit_layout(accel);
        if ctx.hw.layout != Some(layout) {
            ctx.valid.invalidate(Aspect::BlittingFlags);
        }
        if !ctx.valid.is_valid(Aspect::BlittingFlags) {
            G::set_blitting_flags(ctx, flags, layout)?;
            ctx.valid.set(Aspect::BlittingFlags);
        }
        Ok(())
    }

    /// Bring the engine back to a known state after a hang. The mirror is
    /// forgotten so the next `set_state` reprograms everything.
    fn recover(&mut self, err: AccelError) {
        log::error!("{:?}: {err}", G::FAMILY);
        self.ctx.forget_state();
        if let Err(err) = G::restore(&mut self.ctx) {
            log::error!("{:?}: defaults not restored after reset: {err}", G::FAMILY);
        }
    }

    /// Whether the registers are programmed for `accel`.
    fn ready(&self, accel: Accel) -> bool {
        let category = accel.category();
        let valid = &self.ctx.valid;
        if !valid.is_valid(Aspect::Destination) || valid.category() != Some(category) {
            log::debug!("{accel:?} without programmed state");
            return false;
        }
        category == Category::Drawing || self.ctx.hw.layout == Some(blit_layout(accel))
    }

    fn emit(&mut self, batch: &VertexBatch) -> Result<(), AccelError> {
        planar::emit::<B, G>(&mut self.ctx, batch).inspect_err(|err| self.recover(*err))
    }

    fn packed_destination(&self) -> bool {
        self.ctx.hw.dst_format().is_some_and(|f| f.is_packed_422())
    }

    /// # Errors
    /// A hang mid-primitive; the engine has been reset.
    pub fn fill_rectangle(&mut self, rect: &Rectangle) -> Result<bool, AccelError> {
        if !self.ready(Accel::FillRectangle) {
            return Ok(false);
        }
        let rect = if self.packed_destination() { pixel_pairs(rect) } else { *rect };
        self.emit(&emit::fill_rectangle(G::RECT_SHAPE, &rect))?;
        Ok(true)
    }

    /// One-pixel outline of `rect`.
    ///
    /// # Errors
    /// A hang mid-primitive; the engine has been reset.
    pub fn draw_rectangle(&mut self, rect: &Rectangle) -> Result<bool, AccelError> {
        if !self.ready(Accel::DrawRectangle) {
            return Ok(false);
        }
        let mut edges = emit::outline_edges(rect);
        if self.packed_destination() {
            edges.iter_mut().for_each(|edge| *edge = pixel_pairs(edge));
        }
        let batch = emit::rectangles(G::RECT_SHAPE, &edges);
        if batch.vertex_count() > 0 {
            self.emit(&batch)?;
        }
        Ok(true)
    }

    /// # Errors
    /// A hang mid-primitive; the engine has been reset.
    pub fn draw_line(&mut self, line: &Region) -> Result<bool, AccelError> {
        if !self.ready(Accel::DrawLine) {
            return Ok(false);
        }
        self.emit(&emit::draw_line(line))?;
        Ok(true)
    }

    /// # Errors
    /// A hang mid-primitive; the engine has been reset.
    pub fn fill_triangle(&mut self, tri: &Triangle) -> Result<bool, AccelError> {
        if !self.ready(Accel::FillTriangle) {
            return Ok(false);
        }
        self.emit(&emit::fill_triangle(tri))?;
        Ok(true)
    }

    /// Copy `src` to `(dx, dy)`.
    ///
    /// # Errors
    /// A hang mid-primitive; the engine has been reset.
    pub fn blit(&mut self, src: &Rectangle, dx: i32, dy: i32) -> Result<bool, AccelError> {
        if !self.ready(Accel::Blit) {
            return Ok(false);
        }
        self.blit_quad(src, &Rectangle::new(dx, dy, src.w, src.h))?;
        Ok(true)
    }

    /// # Errors
    /// A hang mid-primitive; the engine has been reset.
    pub fn stretch_blit(&mut self, src: &Rectangle, dst: &Rectangle) -> Result<bool, AccelError> {
        if !self.ready(Accel::StretchBlit) {
            return Ok(false);
        }
        self.blit_quad(src, dst)?;
        Ok(true)
    }

    fn blit_quad(&mut self, src: &Rectangle, dst: &Rectangle) -> Result<(), AccelError> {
        let flags = self.ctx.hw.blitting_flags;
        let mut src = *src;
        let mut dst = *dst;
        if flags.contains(BlittingFlags::DEINTERLACE) {
            src.y /= 2;
            src.h /= 2;
        }
        if self.packed_destination() {
            src = pixel_pairs(&src);
            dst = pixel_pairs(&dst);
        }
        let batch = emit::stretch_blit(
            G::RECT_SHAPE,
            &src,
            &dst,
            flags.contains(BlittingFlags::ROTATE180),
            self.texcoord_scale(),
        );
        self.emit(&batch)
    }

    /// Caller-transformed textured triangles.
    ///
    /// Batches longer than one primitive header can announce are refused
    /// before anything is written.
    ///
    /// # Errors
    /// A hang mid-primitive; the engine has been reset.
    pub fn texture_triangles(
        &mut self,
        vertices: &[Vertex],
        formation: TriangleFormation,
    ) -> Result<bool, AccelError> {
        if !self.ready(Accel::TextureTriangles) {
            return Ok(false);
        }
        if vertices.len() > MAX_VERTICES {
            log::debug!("{} vertices exceed one primitive", vertices.len());
            return Ok(false);
        }
        if vertices.is_empty() {
            return Ok(true);
        }
        let batch = emit::texture_triangles(vertices, formation, self.vertex_scale());
        self.emit(&batch)?;
        Ok(true)
    }

    /// Bound source size in texels.
    fn texel_extent(&self) -> (f32, f32) {
        let src = self.ctx.hw.src();
        let width = common::texel_width(&src, self.ctx.hw.dst_format());
        (width.max(1) as f32, src.height.max(1) as f32)
    }

    /// Multiplier taking texel coordinates to what the generation expects.
    fn texcoord_scale(&self) -> (f32, f32) {
        if G::PIXEL_TEXCOORDS {
            return (1.0, 1.0);
        }
        let (w, h) = self.texel_extent();
        (1.0 / w, 1.0 / h)
    }

    /// Multiplier taking normalized coordinates to what the generation
    /// expects.
    fn vertex_scale(&self) -> (f32, f32) {
        if G::PIXEL_TEXCOORDS {
            self.texel_extent()
        } else {
            (1.0, 1.0)
        }
    }

    /// Wait for the engine to drain.
    ///
    /// # Errors
    /// The engine hung and has been reset.
    pub fn engine_sync(&mut self) -> Result<(), AccelError> {
        self.ctx.mmio.idle_wait().inspect_err(|err| self.recover(*err))
    }

    /// Soft-reset the engine and reprogram the generation defaults.
    ///
    /// # Errors
    /// The engine hung again while the defaults were programmed.
    pub fn engine_reset(&mut self) -> Result<(), AccelError> {
        self.ctx.mmio.reset();
        self.ctx.forget_state();
        G::restore(&mut self.ctx)
    }

    /// Someone else touched the registers; reprogram everything next time.
    pub fn invalidate_state(&mut self) {
        self.ctx.forget_state();
    }

    /// Flush rendering out of the engine's caches.
    ///
    /// # Errors
    /// A hang; the engine has been reset.
    pub fn emit_commands(&mut self) -> Result<(), AccelError> {
        G::emit_commands(&mut self.ctx).inspect_err(|err| self.recover(*err))
    }

    #[must_use]
    pub fn fifo_stats(&self) -> FifoStats {
        *self.ctx.mmio.stats()
    }

    #[must_use]
    pub fn is_valid(&self, aspect: Aspect) -> bool {
        self.ctx.valid.is_valid(aspect)
    }

    /// Mirror of the programmed registers.
    #[must_use]
    pub fn hw_state(&self) -> &HwState {
        &self.ctx.hw
    }

    pub fn bus(&self) -> &B {
        self.ctx.mmio.bus()
    }

    pub fn bus_mut(&mut self) -> &mut B {
        self.ctx.mmio.bus_mut()
    }
}

fn blit_layout(accel: Accel) -> VertexLayout {
    if accel == Accel::TextureTriangles {
        VertexLayout::XyzwSt
    } else {
        VertexLayout::XySt
    }
}

/// Rectangle in packed 4:2:2 pixel pairs: every pair holding a covered
/// pixel.
fn pixel_pairs(rect: &Rectangle) -> Rectangle {
    if rect.w <= 0 {
        return Rectangle::new(rect.x.div_euclid(2), rect.y, 0, rect.h);
    }
    let x1 = rect.x.div_euclid(2);
    let x2 = (rect.x + rect.w + 1).div_euclid(2);
    Rectangle::new(x1, rect.y, x2 - x1, rect.h)
}

/// A device of whichever generation was probed.
pub enum AnyDevice<B: Bus> {
    R100(Device<B, R100>),
    R200(Device<B, R200>),
    R300(Device<B, R300>),
}

macro_rules! dispatch {
    ($self:expr, $dev:ident => $body:expr) => {
        match $self {
            AnyDevice::R100($dev) => $body,
            AnyDevice::R200($dev) => $body,
            AnyDevice::R300($dev) => $body,
        }
    };
}

impl<B: Bus> AnyDevice<B> {
    /// # Errors
    /// See [`Device::attach`].
    pub fn attach(family: Family, bus: B, config: DeviceConfig) -> Result<Self, AccelError> {
        Ok(match family {
            Family::R100 => Self::R100(Device::attach(bus, config)?),
            Family::R200 => Self::R200(Device::attach(bus, config)?),
            Family::R300 => Self::R300(Device::attach(bus, config)?),
        })
    }

    pub fn detach(self) -> B {
        dispatch!(self, dev => dev.detach())
    }

    #[must_use]
    pub fn family(&self) -> Family {
        dispatch!(self, dev => dev.family())
    }

    #[must_use]
    pub fn check_state(&self, state: &OperationState, accel: Accel) -> Capability {
        dispatch!(self, dev => dev.check_state(state, accel))
    }

    /// # Errors
    /// See [`Device::set_state`].
    pub fn set_state(&mut self, state: &mut OperationState, accel: Accel) -> Result<(), AccelError> {
        dispatch!(self, dev => dev.set_state(state, accel))
    }

    /// # Errors
    /// See [`Device::fill_rectangle`].
    pub fn fill_rectangle(&mut self, rect: &Rectangle) -> Result<bool, AccelError> {
        dispatch!(self, dev => dev.fill_rectangle(rect))
    }

    /// # Errors
    /// See [`Device::draw_rectangle`].
    pub fn draw_rectangle(&mut self, rect: &Rectangle) -> Result<bool, AccelError> {
        dispatch!(self, dev => dev.draw_rectangle(rect))
    }

    /// # Errors
    /// See [`Device::draw_line`].
    pub fn draw_line(&mut self, line: &Region) -> Result<bool, AccelError> {
        dispatch!(self, dev => dev.draw_line(line))
    }

    /// # Errors
    /// See [`Device::fill_triangle`].
    pub fn fill_triangle(&mut self, tri: &Triangle) -> Result<bool, AccelError> {
        dispatch!(self, dev => dev.fill_triangle(tri))
    }

    /// # Errors
    /// See [`Device::blit`].
    pub fn blit(&mut self, src: &Rectangle, dx: i32, dy: i32) -> Result<bool, AccelError> {
        dispatch!(self, dev => dev.blit(src, dx, dy))
    }

    /// # Errors
    /// See [`Device::stretch_blit`].
    pub fn stretch_blit(&mut self, src: &Rectangle, dst: &Rectangle) -> Result<bool, AccelError> {
        dispatch!(self, dev => dev.stretch_blit(src, dst))
    }

    /// # Errors
    /// See [`Device::texture_triangles`].
    pub fn texture_triangles(
        &mut self,
        vertices: &[Vertex],
        formation: TriangleFormation,
    ) -> Result<bool, AccelError> {
        dispatch!(self, dev => dev.texture_triangles(vertices, formation))
    }

    /// # Errors
    /// See [`Device::engine_sync`].
    pub fn engine_sync(&mut self) -> Result<(), AccelError> {
        dispatch!(self, dev => dev.engine_sync())
    }

    /// # Errors
    /// See [`Device::engine_reset`].
    pub fn engine_reset(&mut self) -> Result<(), AccelError> {
        dispatch!(self, dev => dev.engine_reset())
    }

    pub fn invalidate_state(&mut self) {
        dispatch!(self, dev => dev.invalidate_state());
    }

    /// # Errors
    /// See [`Device::emit_commands`].
    pub fn emit_commands(&mut self) -> Result<(), AccelError> {
        dispatch!(self, dev => dev.emit_commands())
    }

    #[must_use]
    pub fn fifo_stats(&self) -> FifoStats {
        dispatch!(self, dev => dev.fifo_stats())
    }

    #[must_use]
    pub fn is_valid(&self, aspect: Aspect) -> bool {
        dispatch!(self, dev => dev.is_valid(aspect))
    }

    pub fn bus(&self) -> &B {
        dispatch!(self, dev => dev.bus())
    }

    pub fn bus_mut(&mut self) -> &mut B {
        dispatch!(self, dev => dev.bus_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_pairs_round_outwards() {
        assert_eq!(pixel_pairs(&Rectangle::new(3, 1, 5, 2)), Rectangle::new(1, 1, 3, 2));
        assert_eq!(pixel_pairs(&Rectangle::new(4, 0, 4, 1)), Rectangle::new(2, 0, 2, 1));
        assert_eq!(pixel_pairs(&Rectangle::new(3, 0, 2, 1)), Rectangle::new(1, 0, 2, 1));
        assert_eq!(pixel_pairs(&Rectangle::new(5, 0, 1, 1)), Rectangle::new(2, 0, 1, 1));
        assert_eq!(pixel_pairs(&Rectangle::new(-3, 0, 2, 1)), Rectangle::new(-2, 0, 2, 1));
    }

    #[test]
    fn texture_triangles_use_homogeneous_layout() {
        assert_eq!(blit_layout(Accel::TextureTriangles), VertexLayout::XyzwSt);
        assert_eq!(blit_layout(Accel::StretchBlit), VertexLayout::XySt);
    }
}
