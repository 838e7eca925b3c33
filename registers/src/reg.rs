//! Packed register values.

/// A 32-bit register layout.
///
/// Layouts are not tied to a single offset: the same packing is frequently
/// programmed into several registers (the 2D and 3D clip corners, for one).
pub trait Register: Copy {
    fn from_raw(val: u32) -> Self;

    fn to_raw(self) -> u32;
}

/// Coordinate pair packed as `Y[31:16] | X[15:0]`.
///
/// Used by the 2D scissor corners, the 3D rasteriser clip and texture size
/// registers of the fixed-function generations.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct YxReg(u32);

impl Register for YxReg {
    fn from_raw(val: u32) -> Self {
        Self(val)
    }

    fn to_raw(self) -> u32 {
        self.0
    }
}

impl YxReg {
    pub const X_OFFSET: usize = 0;
    pub const X_WIDTH: usize = 16;
    pub const X_MASK: u32 = 0xffff;

    pub const Y_OFFSET: usize = 16;
    pub const Y_WIDTH: usize = 16;
    pub const Y_MASK: u32 = 0xffff;

    /// Pack signed coordinates; negative values keep their two's complement
    /// low half, which is what the hardware expects.
    #[inline(always)]
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        let mut reg = Self(0);
        reg.set_x(x as u32);
        reg.set_y(y as u32);
        reg
    }

    #[inline(always)]
    #[must_use]
    pub fn x(&self) -> u32 {
        (self.0 >> Self::X_OFFSET) & Self::X_MASK
    }

    #[inline(always)]
    pub fn set_x(&mut self, val: u32) {
        self.0 = (self.0 & !(Self::X_MASK << Self::X_OFFSET))
            | ((val & Self::X_MASK) << Self::X_OFFSET);
    }

    #[inline(always)]
    #[must_use]
    pub fn y(&self) -> u32 {
        (self.0 >> Self::Y_OFFSET) & Self::Y_MASK
    }

    #[inline(always)]
    pub fn set_y(&mut self, val: u32) {
        self.0 = (self.0 & !(Self::Y_MASK << Self::Y_OFFSET))
            | ((val & Self::Y_MASK) << Self::Y_OFFSET);
    }
}
