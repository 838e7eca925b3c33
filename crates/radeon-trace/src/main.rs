//! Runs one acceleration scenario against a recording bus and prints the
//! register traffic it produces.

mod bus;

use std::io::Write;

use anyhow::{bail, Context as _};
use clap::{Parser, ValueEnum};
use radeon_core::{
    Accel, AnyDevice, BlittingFlags, Category, Color, DeviceConfig, Family, OperationState, PixelFormat, Rectangle,
    Region, Surface, Triangle, TriangleFormation, Vertex,
};

use crate::bus::RecordingBus;

#[derive(Parser)]
#[command(name = "radeon-trace")]
#[command(about = "Trace the register writes of accelerated operations", long_about = None)]
struct Cli {
    /// Operation to run
    scenario: Scenario,

    /// Engine generation
    #[arg(short, long, value_enum, default_value = "r100")]
    generation: Generation,

    /// Destination pixel format
    #[arg(short, long, value_enum, default_value = "rgb16")]
    format: Format,

    /// Destination width in pixels
    #[arg(long, default_value = "320")]
    width: u32,

    /// Destination height in pixels
    #[arg(long, default_value = "240")]
    height: u32,

    /// Print FIFO statistics after the trace
    #[arg(long)]
    dump_stats: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Generation {
    R100,
    R200,
    R300,
}

impl Generation {
    fn family(self) -> Family {
        match self {
            Self::R100 => Family::R100,
            Self::R200 => Family::R200,
            Self::R300 => Family::R300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    A8,
    Rgb332,
    Argb1555,
    Argb4444,
    Rgb16,
    Rgb32,
    Argb,
    Ayuv,
    Yuy2,
    Uyvy,
    I420,
    Yv12,
}

impl Format {
    fn pixel_format(self) -> PixelFormat {
        match self {
            Self::A8 => PixelFormat::A8,
            Self::Rgb332 => PixelFormat::Rgb332,
            Self::Argb1555 => PixelFormat::Argb1555,
            Self::Argb4444 => PixelFormat::Argb4444,
            Self::Rgb16 => PixelFormat::Rgb16,
            Self::Rgb32 => PixelFormat::Rgb32,
            Self::Argb => PixelFormat::Argb,
            Self::Ayuv => PixelFormat::Ayuv,
            Self::Yuy2 => PixelFormat::Yuy2,
            Self::Uyvy => PixelFormat::Uyvy,
            Self::I420 => PixelFormat::I420,
            Self::Yv12 => PixelFormat::Yv12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    Fill,
    Outline,
    Line,
    Triangle,
    Blit,
    Rotate,
    PlanarFill,
    PlanarBlit,
    Textured,
}

impl Scenario {
    fn accel(self) -> Accel {
        match self {
            Self::Fill | Self::PlanarFill => Accel::FillRectangle,
            Self::Outline => Accel::DrawRectangle,
            Self::Line => Accel::DrawLine,
            Self::Triangle => Accel::FillTriangle,
            Self::Blit | Self::PlanarBlit => Accel::Blit,
            Self::Rotate => Accel::StretchBlit,
            Self::Textured => Accel::TextureTriangles,
        }
    }

    fn planar(self) -> bool {
        matches!(self, Self::PlanarFill | Self::PlanarBlit)
    }
}

/// Bytes a surface occupies, rounded up to a 4 KiB boundary.
fn footprint(surface: &Surface) -> u32 {
    let luma = surface.pitch * surface.height;
    let size = if surface.format.is_planar() { luma + luma / 2 } else { luma };
    size.next_multiple_of(4096)
}

fn surface(format: PixelFormat, width: u32, height: u32, offset: u32) -> Surface {
    let pitch = if format.is_planar() {
        width
    } else {
        width * format.bytes_per_pixel()
    };
    Surface::new(format, width, height, offset, pitch.next_multiple_of(64))
}

fn run(device: &mut AnyDevice<RecordingBus>, scenario: Scenario, dst: &Surface) -> anyhow::Result<()> {
    let accel = scenario.accel();
    let (w, h) = (dst.width as i32, dst.height as i32);

    let mut state = OperationState::new(dst.clone());
    state.set_color(Color::new(0xff, 0x20, 0x80, 0xe0));
    if accel.category() == Category::Blitting {
        let source = surface(dst.format, dst.width / 2, dst.height / 2, footprint(dst));
        state.set_source(Some(source));
    }
    if scenario == Scenario::Rotate {
        state.set_blitting_flags(BlittingFlags::ROTATE180);
    }

    let cap = device.check_state(&state, accel);
    if !cap.supports(accel) {
        bail!("{accel:?} is not accelerated for {:?} on {:?}", dst.format, device.family());
    }

    device.bus_mut().section("set_state");
    device.set_state(&mut state, accel)?;

    device.bus_mut().section("primitive");
    let quarter = Rectangle::new(w / 4, h / 4, w / 2, h / 2);
    let handled = match scenario {
        Scenario::Fill | Scenario::PlanarFill => device.fill_rectangle(&quarter)?,
        Scenario::Outline => device.draw_rectangle(&quarter)?,
        Scenario::Line => device.draw_line(&Region::new(0, 0, w - 1, h - 1))?,
        Scenario::Triangle => device.fill_triangle(&Triangle {
            x1: w / 2,
            y1: 0,
            x2: w - 1,
            y2: h - 1,
            x3: 0,
            y3: h - 1,
        })?,
        Scenario::Blit | Scenario::PlanarBlit => device.blit(&Rectangle::new(0, 0, w / 4, h / 4), w / 2, h / 2)?,
        Scenario::Rotate => device.stretch_blit(&Rectangle::new(0, 0, w / 2, h / 2), &Rectangle::new(0, 0, w, h))?,
        Scenario::Textured => {
            let corner = |x: f32, y: f32| Vertex {
                x: x * w as f32,
                y: y * h as f32,
                z: 0.0,
                w: 1.0,
                s: x,
                t: y,
            };
            let fan = [corner(0.0, 0.0), corner(1.0, 0.0), corner(1.0, 1.0), corner(0.0, 1.0)];
            device.texture_triangles(&fan, TriangleFormation::Fan)?
        }
    };
    if !handled {
        bail!("{accel:?} was refused after set_state");
    }

    device.bus_mut().section("flush");
    device.emit_commands()?;
    device.engine_sync()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let family = cli.generation.family();
    let mut format = cli.format.pixel_format();
    if cli.scenario.planar() && !format.is_planar() {
        log::info!("{:?} needs a planar destination, using I420", cli.scenario);
        format = PixelFormat::I420;
    }
    if cli.width < 8 || cli.height < 8 {
        bail!("destination must be at least 8x8");
    }

    let dst = surface(format, cli.width, cli.height, 0);
    // Room for the destination and a half-size source, then the scratch pixel.
    let scratch_offset = footprint(&dst) * 2;
    let config = DeviceConfig {
        scratch_offset,
        ..DeviceConfig::default()
    };

    let mut bus = RecordingBus::new();
    bus.section("attach");
    let mut device = AnyDevice::attach(family, bus, config).context("attach failed")?;
    run(&mut device, cli.scenario, &dst).with_context(|| format!("{:?} on {family:?}", cli.scenario))?;

    let stats = device.fifo_stats();
    device.bus_mut().section("detach");
    let bus = device.detach();

    let mut out = std::io::stdout().lock();
    bus.dump(family, &mut out)?;
    log::info!("{} register writes", bus.register_writes());
    if cli.dump_stats {
        writeln!(out, "# fifo")?;
        writeln!(out, "reserve calls     {}", stats.reserve_calls)?;
        writeln!(out, "slots requested   {}", stats.slots_requested)?;
        writeln!(out, "wait cycles       {}", stats.wait_cycles)?;
        writeln!(out, "cache hits        {}", stats.cache_hits)?;
        writeln!(out, "idle calls        {}", stats.idle_calls)?;
        writeln!(out, "idle wait cycles  {}", stats.idle_wait_cycles)?;
        writeln!(out, "resets            {}", stats.resets)?;
    }
    Ok(())
}
