/// Green-zone clustering: groups campus building locations with k-means and
/// writes the labelled points for the dashboard's green-zone layer.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use campus_core::buildings::load_coordinate_points;
use campus_core::green_zones::{save_points, GreenZonePoint};
use campus_core::kmeans::{KMeans, Point};

#[derive(Parser, Debug)]
#[command(name = "green_zones", about = "Cluster building coordinates into green zones")]
struct Args {
    /// Building table exported from OpenStreetMap (needs a `coordinates` column).
    #[arg(short, long, default_value = "data/campus_osm_data.csv")]
    input: PathBuf,

    /// Output CSV with latitude, longitude and cluster label.
    #[arg(short, long, default_value = "data/green_zone_output.csv")]
    output: PathBuf,

    /// Number of zones.
    #[arg(short = 'k', long, default_value = "2")]
    clusters: usize,

    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let locations = load_coordinate_points(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    eprintln!("Valid coordinate points: {}", locations.len());

    if locations.len() < 2 {
        bail!("Not enough valid points for k-means clustering ({} found)", locations.len());
    }

    let points: Vec<Point> = locations.iter().map(|ll| [ll.lat, ll.lon]).collect();
    let fit = KMeans::new(args.clusters).with_seed(args.seed).fit(&points)?;
    eprintln!("Converged after {} iterations, inertia {:.6}", fit.iterations, fit.inertia);

    let labelled: Vec<GreenZonePoint> = locations
        .iter()
        .zip(&fit.labels)
        .map(|(ll, &label)| GreenZonePoint {
            latitude: ll.lat,
            longitude: ll.lon,
            green_cluster: label as u32,
        })
        .collect();

    for (i, c) in fit.centroids.iter().enumerate() {
        let members = fit.labels.iter().filter(|&&l| l == i).count();
        eprintln!("  zone {i}: {members:>4} points, centroid ({:.5}, {:.5})", c[0], c[1]);
    }

    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    save_points(&args.output, &labelled)?;
    eprintln!("Wrote {} points to {}", labelled.len(), args.output.display());

    Ok(())
}
