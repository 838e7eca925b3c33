//! Vertex and fragment microcode uploaded once per engine reset.
//!
//! Every fragment program lives at a fixed offset in instruction memory, so
//! switching programs only rewrites the code window registers.

/// Pass-through vertex program: output 0 = input 0 (position), output 1 =
/// input 1 (texture coordinate 0).
pub const PASSTHROUGH_VS: [u32; 8] = [
    0x00f0_0203, 0x00d1_0001, 0x0124_8001, 0x0124_8001, //
    0x00f0_2203, 0x00d1_0021, 0x0124_8021, 0x0124_8021,
];

/// VAP_PVS_CODE_CNTL_0 for [`PASSTHROUGH_VS`]: first 0, xyzw valid 1, last 1.
pub const PVS_CODE_CNTL_0: u32 = (1 << 10) | (1 << 20);
/// VAP_PVS_CODE_CNTL_1: last vertex source instruction.
pub const PVS_CODE_CNTL_1: u32 = 1;

/// One paired RGB/alpha ALU instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluInst {
    pub rgb_addr: u32,
    pub alpha_addr: u32,
    pub rgb_inst: u32,
    pub alpha_inst: u32,
}

/// A fragment program image.
#[derive(Debug)]
pub struct FragmentProgram {
    pub tex: &'static [u32],
    pub alu: &'static [AluInst],
    /// Highest temporary register used.
    pub max_temp: u32,
}

/// US_TEX_INST: load texture `unit` at coordinate 0 into temp 0.
const fn tex_ld(unit: u32) -> u32 {
    (unit << 11) | (1 << 15)
}

// Addresses: temp 0 or constant 0 (bit 5) in each of the three source slots.
const ADDR_TEMP0: u32 = 0x0000_0000;
const ADDR_CONST0: u32 = 0x0000_0020;
const ADDR_TEMP0_CONST0: u32 = 0x0000_0800;

// Instructions: `MAD` with output to the colour buffer.
const RGB_OUT_SRC0: u32 = 0x0050_a000;
const ALPHA_OUT_SRC0: u32 = 0x0040_8000;
const RGB_OUT_SRC0_MUL_SRC1: u32 = 0x0050_a020;
const ALPHA_OUT_SRC0_MUL_SRC1: u32 = 0x0040_8020;
const ALPHA_OUT_SRC1: u32 = 0x0040_8001;
const RGB_OUT_SRC0_MUL_SRC0_ALPHA: u32 = 0x0050_a060;

// Clearing the output enable keeps the result in temp 0 for the next
// instruction.
const OUTPUT_ENABLE: u32 = 0x0040_0000;
const RGB_TEMP0_SRC0_MUL_SRC1: u32 = RGB_OUT_SRC0_MUL_SRC1 & !OUTPUT_ENABLE;
const ALPHA_TEMP0_SRC0_MUL_SRC1: u32 = ALPHA_OUT_SRC0_MUL_SRC1 & !OUTPUT_ENABLE;

static FILL: FragmentProgram = FragmentProgram {
    tex: &[],
    alu: &[AluInst {
        rgb_addr: ADDR_CONST0,
        alpha_addr: ADDR_CONST0,
        rgb_inst: RGB_OUT_SRC0,
        alpha_inst: ALPHA_OUT_SRC0,
    }],
    max_temp: 0,
};

static FILL_422: FragmentProgram = FragmentProgram {
    tex: &[tex_ld(1)],
    alu: &[AluInst {
        rgb_addr: ADDR_TEMP0,
        alpha_addr: ADDR_TEMP0,
        rgb_inst: RGB_OUT_SRC0,
        alpha_inst: ALPHA_OUT_SRC0,
    }],
    max_temp: 0,
};

static BLIT: FragmentProgram = FragmentProgram {
    tex: &[tex_ld(0)],
    alu: &[AluInst {
        rgb_addr: ADDR_TEMP0,
        alpha_addr: ADDR_TEMP0,
        rgb_inst: RGB_OUT_SRC0,
        alpha_inst: ALPHA_OUT_SRC0,
    }],
    max_temp: 0,
};

static BLIT_COLORIZE: FragmentProgram = FragmentProgram {
    tex: &[tex_ld(0)],
    alu: &[AluInst {
        rgb_addr: ADDR_TEMP0_CONST0,
        alpha_addr: ADDR_TEMP0,
        rgb_inst: RGB_OUT_SRC0_MUL_SRC1,
        alpha_inst: ALPHA_OUT_SRC0,
    }],
    max_temp: 0,
};

static BLIT_COLORALPHA: FragmentProgram = FragmentProgram {
    tex: &[tex_ld(0)],
    alu: &[AluInst {
        rgb_addr: ADDR_TEMP0,
        alpha_addr: ADDR_TEMP0_CONST0,
        rgb_inst: RGB_OUT_SRC0,
        alpha_inst: ALPHA_OUT_SRC1,
    }],
    max_temp: 0,
};

static BLIT_MODULATE: FragmentProgram = FragmentProgram {
    tex: &[tex_ld(0)],
    alu: &[AluInst {
        rgb_addr: ADDR_TEMP0_CONST0,
        alpha_addr: ADDR_TEMP0_CONST0,
        rgb_inst: RGB_OUT_SRC0_MUL_SRC1,
        alpha_inst: ALPHA_OUT_SRC0_MUL_SRC1,
    }],
    max_temp: 0,
};

static BLIT_PREMULTIPLY: FragmentProgram = FragmentProgram {
    tex: &[tex_ld(0)],
    alu: &[AluInst {
        rgb_addr: ADDR_TEMP0,
        alpha_addr: ADDR_TEMP0,
        rgb_inst: RGB_OUT_SRC0_MUL_SRC0_ALPHA,
        alpha_inst: ALPHA_OUT_SRC0,
    }],
    max_temp: 0,
};

static BLIT_MODULATE_COLORALPHA: FragmentProgram = FragmentProgram {
    tex: &[tex_ld(0)],
    alu: &[AluInst {
        rgb_addr: ADDR_TEMP0_CONST0,
        alpha_addr: ADDR_TEMP0_CONST0,
        rgb_inst: RGB_OUT_SRC0_MUL_SRC1,
        alpha_inst: ALPHA_OUT_SRC1,
    }],
    max_temp: 0,
};

static BLIT_PREMULTIPLY_MODULATE: FragmentProgram = FragmentProgram {
    tex: &[tex_ld(0)],
    alu: &[
        AluInst {
            rgb_addr: ADDR_TEMP0_CONST0,
            alpha_addr: ADDR_TEMP0_CONST0,
            rgb_inst: RGB_TEMP0_SRC0_MUL_SRC1,
            alpha_inst: ALPHA_TEMP0_SRC0_MUL_SRC1,
        },
        AluInst {
            rgb_addr: ADDR_TEMP0,
            alpha_addr: ADDR_TEMP0,
            rgb_inst: RGB_OUT_SRC0_MUL_SRC0_ALPHA,
            alpha_inst: ALPHA_OUT_SRC0,
        },
    ],
    max_temp: 0,
};

/// Resident fragment programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    /// Constant colour from PFS_PARAM_0.
    Fill,
    /// Constant colour sampled from a staged pixel on texture unit 1.
    Fill422,
    Blit,
    /// Texture colour modulated by the constant colour.
    BlitColorize,
    /// Texture colour with constant alpha.
    BlitColorAlpha,
    /// Texture colour and alpha modulated by the constant.
    BlitModulate,
    /// Texture colour multiplied by texture alpha.
    BlitPremultiply,
    /// Texture colour modulated by the constant, constant alpha.
    BlitModulateColorAlpha,
    /// [`Program::BlitModulate`], then colour multiplied by the resulting
    /// alpha.
    BlitPremultiplyModulate,
}

impl Program {
    /// Upload order; offsets in instruction memory follow from it.
    pub const ALL: [Self; 9] = [
        Self::Fill,
        Self::Fill422,
        Self::Blit,
        Self::BlitColorize,
        Self::BlitColorAlpha,
        Self::BlitModulate,
        Self::BlitPremultiply,
        Self::BlitModulateColorAlpha,
        Self::BlitPremultiplyModulate,
    ];

    #[must_use]
    pub fn code(self) -> &'static FragmentProgram {
        match self {
            Self::Fill => &FILL,
            Self::Fill422 => &FILL_422,
            Self::Blit => &BLIT,
            Self::BlitColorize => &BLIT_COLORIZE,
            Self::BlitColorAlpha => &BLIT_COLORALPHA,
            Self::BlitModulate => &BLIT_MODULATE,
            Self::BlitPremultiply => &BLIT_PREMULTIPLY,
            Self::BlitModulateColorAlpha => &BLIT_MODULATE_COLORALPHA,
            Self::BlitPremultiplyModulate => &BLIT_PREMULTIPLY_MODULATE,
        }
    }

    /// First ALU and TEX instruction slot of this program.
    #[must_use]
    pub fn base(self) -> (u32, u32) {
        let mut alu = 0;
        let mut tex = 0;
        for program in Self::ALL {
            if program == self {
                break;
            }
            alu += program.code().alu.len() as u32;
            tex += program.code().tex.len() as u32;
        }
        (alu, tex)
    }

    /// US_CONFIG: single level, texture lookups first when present.
    #[must_use]
    pub fn us_config(self) -> u32 {
        if self.code().tex.is_empty() {
            0
        } else {
            1 << 3
        }
    }

    /// US_CODE_OFFSET: absolute window into instruction memory.
    #[must_use]
    pub fn code_offset(self) -> u32 {
        let code = self.code();
        let (alu_base, tex_base) = self.base();
        let alu_size = code.alu.len() as u32 - 1;
        let tex_size = (code.tex.len() as u32).saturating_sub(1);
        (alu_base & 0x3f) | ((alu_size & 0x7f) << 6) | ((tex_base & 0x1f) << 13) | ((tex_size & 0x1f) << 18)
    }

    /// US_CODE_ADDR_3: the only active level, relative to the window.
    #[must_use]
    pub fn code_addr(self) -> u32 {
        let code = self.code();
        let alu_size = code.alu.len() as u32 - 1;
        let tex_size = (code.tex.len() as u32).saturating_sub(1);
        ((alu_size & 0x3f) << 6) | ((tex_size & 0x1f) << 17) | (1 << 22)
    }

    /// Texture coordinate components the rasteriser must interpolate.
    #[must_use]
    pub fn texcoords(self) -> u32 {
        match self {
            Self::Fill | Self::Fill422 => 0,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn programs_are_laid_out_back_to_back() {
        assert_eq!(Program::Fill.base(), (0, 0));
        assert_eq!(Program::Fill422.base(), (1, 0));
        assert_eq!(Program::Blit.base(), (2, 1));
        assert_eq!(Program::BlitPremultiply.base(), (6, 5));
        assert_eq!(Program::BlitPremultiplyModulate.base(), (8, 7));
    }

    #[test]
    fn two_instruction_program_window() {
        let program = Program::BlitPremultiplyModulate;
        assert_eq!(program.code_offset(), 8 | (1 << 6) | (7 << 13));
        assert_eq!(program.code_addr(), (1 << 6) | (1 << 22));
        let first = program.code().alu[0];
        assert_eq!(first.rgb_inst & OUTPUT_ENABLE, 0);
        assert_eq!(program.code().alu[1].rgb_inst & OUTPUT_ENABLE, OUTPUT_ENABLE);
    }

    #[test]
    fn fill_has_no_texture_stage() {
        assert_eq!(Program::Fill.us_config(), 0);
        assert_eq!(Program::Fill.code_offset(), 0);
        assert_eq!(Program::Blit.us_config(), 1 << 3);
    }
}
