//! Compare the direct and symmetry-accelerated transforms on synthetic
//! full-disk grids.
//!
//! Run with: cargo run --release --bin grid-performance -- --sizes 500,1000,2000

use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use geodetic_grid::{GeodeticGrid, ProjectionParameters, Step};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "grid-performance")]
#[command(about = "Time direct vs fast geodetic grid assembly")]
struct Args {
    /// Grid edge lengths to test
    #[arg(long, value_delimiter = ',', default_value = "250,500,1000")]
    sizes: Vec<usize>,

    /// Iterations per measurement
    #[arg(short, long, default_value_t = 3)]
    iterations: u32,

    /// Use GOES-West geometry instead of GOES-East
    #[arg(long)]
    west: bool,

    /// Also time corner grids
    #[arg(long)]
    corners: bool,

    /// Half extent of the scan-angle axes (radians)
    #[arg(long, default_value_t = 0.151872)]
    half_extent: f64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Scan-angle axes mirrored about nadir, y running north to south.
fn full_disk(size: usize, half_extent: f64, west: bool) -> Result<ProjectionParameters> {
    let spacing = 2.0 * half_extent / size as f64;
    let x: Vec<f64> = (0..size)
        .map(|i| -half_extent + spacing * (i as f64 + 0.5))
        .collect();
    let y: Vec<f64> = x.iter().rev().copied().collect();
    let params = if west {
        ProjectionParameters::goes_west(x, y)
    } else {
        ProjectionParameters::goes_east(x, y)
    };
    params.context("building projection parameters")
}

fn time_algorithm(params: &ProjectionParameters, algorithm: &str, iterations: u32) -> Result<(u128, GeodeticGrid)> {
    let mut last = None;
    let start = Instant::now();
    for _ in 0..iterations {
        last = Some(GeodeticGrid::calculate(params, algorithm, Step::FULL)?);
    }
    let elapsed_us = start.elapsed().as_micros() / u128::from(iterations);
    let grid = last.context("no iterations ran")?;
    Ok((elapsed_us, grid))
}

fn max_difference(a: &GeodeticGrid, b: &GeodeticGrid) -> f64 {
    a.latitude()
        .iter()
        .zip(b.latitude().iter())
        .chain(a.longitude().iter().zip(b.longitude().iter()))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| f64::from((x - y).abs()))
        .fold(0.0, f64::max)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).with_target(true).init();

    if args.iterations == 0 {
        bail!("--iterations must be at least 1");
    }

    let anchors: &[&str] = if args.corners { &["", "[corner]"] } else { &[""] };

    println!("Geodetic Grid Performance");
    println!("=========================\n");
    println!(
        "{:<16} {:>12} {:>12} {:>9} {:>10} {:>12}",
        "Grid", "Direct", "Fast", "Speedup", "Valid", "Max diff"
    );
    println!("{:-<76}", "");

    let mut total_direct = 0u128;
    let mut total_fast = 0u128;

    for &size in &args.sizes {
        let params = full_disk(size, args.half_extent, args.west)?;
        for anchor in anchors {
            let (direct_us, direct) = time_algorithm(&params, &format!("direct{}", anchor), args.iterations)?;
            let (fast_us, fast) = time_algorithm(&params, &format!("fast{}", anchor), args.iterations)?;

            if fast.mask() != direct.mask() {
                bail!("{}{}: fast and direct masks differ", size, anchor);
            }

            let speedup = direct_us as f64 / fast_us.max(1) as f64;
            let (rows, cols) = direct.shape();
            println!(
                "{:<16} {:>9} µs {:>9} µs {:>8.2}x {:>10} {:>12.2e}",
                format!("{}x{}{}", rows, cols, anchor),
                direct_us,
                fast_us,
                speedup,
                direct.valid_count(),
                max_difference(&direct, &fast)
            );

            total_direct += direct_us;
            total_fast += fast_us;
        }
    }

    println!("{:-<76}", "");
    let speedup = total_direct as f64 / total_fast.max(1) as f64;
    info!(total_direct_us = %total_direct, total_fast_us = %total_fast, speedup, "Timing complete");
    println!("\nOverall speedup: {:.2}x", speedup);

    Ok(())
}
