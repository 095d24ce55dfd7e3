use astro_assist::frame::{is_logical_size, load_luma, logical_source};
use astro_assist::hfd::{FocusAssist, FocusMode, FocusParams, GaugeScale};
use astro_assist::PixelSource;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use astro_assist::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use astro_assist::core::{init_with_level, level_from_env};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing(false);
    #[cfg(not(feature = "tracing"))]
    init_with_level(level_from_env(log::LevelFilter::Info)).map_err(|e| e.to_string())?;

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: focus_frame <image_path> [x y]");
        return Ok(());
    };
    let coord = |i: usize, default: i32| {
        std::env::args()
            .nth(i)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    };
    let af_point = Point2::new(coord(2, 360), coord(3, 240));

    let img = load_luma(path)?;
    if !is_logical_size(&img) {
        println!("scaling {}x{} to the logical screen", img.width(), img.height());
    }
    let source = logical_source(&img)?;

    // Frames larger than the screen are read at full resolution.
    let mode = if is_logical_size(&img) {
        FocusMode::Preview
    } else {
        FocusMode::Raw
    };
    let mut focus = FocusAssist::new(FocusParams {
        mode,
        ..FocusParams::default()
    });
    let reading = focus.poll_scaled(&source, af_point)?;
    let scale = GaugeScale::for_mode(mode, false, source.full_scale());
    let (hfd_gauge, peak_gauge) = reading.gauges(&scale);

    println!(
        "star at ({}, {}): hfd {:.2} px, peak {}, gauges {:.2}/{:.2}",
        reading.signature.x,
        reading.signature.y,
        reading.signature.hfd_px(),
        reading.brightest,
        hfd_gauge,
        peak_gauge
    );
    Ok(())
}
