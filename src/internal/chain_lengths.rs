#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::cast_precision_loss)]

use chained_hash::{StringHashMap, TableConfig, logger};
use log::info;
use plotters::prelude::*;
use rand::{Rng, distr::Alphanumeric};

// Keys inserted into every table, regardless of load factor
const KEYS_PER_RUN: usize = 100_000;
// Load factors from 0.25 to 1.0
const NUM_LOAD_FACTORS: usize = 10;
const MIN_LOAD_FACTOR: f64 = 0.25;
const MAX_LOAD_FACTOR: f64 = 1.0;
const OUTPUT: &str = "chain_lengths.png";

/// Bucket occupancy of one filled table
#[derive(Debug, Clone, Copy)]
struct RunStats {
    load_factor: f64,
    capacity: usize,
    average_chain: f64,
    longest_chain: usize,
    empty_ratio: f64,
}

// Alphanumeric key between 4 and 15 characters long
fn random_key<R: Rng>(rng: &mut R) -> String {
    let len = rng.random_range(4..16);
    rng.sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn measure(load_factor: f64, keys: &[String]) -> Result<RunStats, Box<dyn std::error::Error>> {
    let mut map = StringHashMap::with_config(TableConfig::new().with_load_factor(load_factor))?;
    for key in keys {
        map.set(key.as_str(), ())?;
    }

    let lengths: Vec<usize> = map.chain_lengths().collect();
    let occupied: Vec<usize> = lengths.iter().copied().filter(|&len| len > 0).collect();
    let average_chain = if occupied.is_empty() {
        0.0
    } else {
        occupied.iter().sum::<usize>() as f64 / occupied.len() as f64
    };

    Ok(RunStats {
        load_factor,
        capacity: map.capacity(),
        average_chain,
        longest_chain: lengths.iter().copied().max().unwrap_or(0),
        empty_ratio: (lengths.len() - occupied.len()) as f64 / lengths.len().max(1) as f64,
    })
}

fn average_chain(run: &RunStats) -> f64 {
    run.average_chain
}

fn longest_chain(run: &RunStats) -> f64 {
    run.longest_chain as f64
}

fn plot(runs: &[RunStats]) -> Result<(), Box<dyn std::error::Error>> {
    let font_family = "sans-serif";
    let line_width = 2;
    let marker_size = 4;
    let text_size = 16;
    let title_size = 35;

    let root = BitMapBackend::new(OUTPUT, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_chain = runs.iter().map(|run| run.longest_chain).max().unwrap_or(1).max(1) as f64 * 1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption("Bucket Chain Length by Load Factor", (font_family, title_size))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .right_y_label_area_size(10)
        .build_cartesian_2d(MIN_LOAD_FACTOR - 0.05..MAX_LOAD_FACTOR + 0.05, 0.0..max_chain)?;

    chart
        .configure_mesh()
        .x_desc("Load Factor")
        .y_desc("Entries per Bucket")
        .axis_desc_style((font_family, text_size))
        .draw()?;

    let series: [(&str, RGBColor, fn(&RunStats) -> f64); 2] = [
        ("Average chain (occupied buckets)", RGBColor(50, 90, 220), average_chain),
        ("Longest chain", RGBColor(220, 50, 50), longest_chain),
    ];

    for (label, color, value) in series {
        let line_style = ShapeStyle::from(&color).stroke_width(line_width);

        chart
            .draw_series(LineSeries::new(
                runs.iter().map(|run| (run.load_factor, value(run))),
                line_style,
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series(
            runs.iter()
                .map(|run| Circle::new((run.load_factor, value(run)), marker_size, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger::initialize_logger();

    let load_factors: Vec<f64> = (0..NUM_LOAD_FACTORS)
        .map(|i| {
            MIN_LOAD_FACTOR +
                (MAX_LOAD_FACTOR - MIN_LOAD_FACTOR) * (i as f64) /
                    ((NUM_LOAD_FACTORS - 1) as f64)
        })
        .collect();

    // Generate random keys once so every load factor sees the same input
    let mut rng = rand::rng();
    let keys: Vec<String> = (0..KEYS_PER_RUN).map(|_| random_key(&mut rng)).collect();

    let mut runs = Vec::with_capacity(load_factors.len());
    for &load_factor in &load_factors {
        info!("Filling table with {KEYS_PER_RUN} keys at load factor {load_factor:.2}");
        let run = measure(load_factor, &keys)?;

        println!(
            "  load {:.2}: capacity = {}, avg chain = {:.3}, longest = {}, empty = {:.1}%",
            run.load_factor,
            run.capacity,
            run.average_chain,
            run.longest_chain,
            run.empty_ratio * 100.0
        );
        runs.push(run);
    }

    plot(&runs)?;
    println!("Generated plot image: {OUTPUT}");

    Ok(())
}
