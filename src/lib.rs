//! Scores transit stations from origin/destination usage data and renders
//! the result as a station heatmap.
//!
//! The pieces compose as a pipeline: [`ingest`] loads stations and
//! date-filtered usage rows, [`weights`] turns two draggable cut points
//! into a normalized weight triple, [`score`] computes the attractiveness
//! metrics, [`api`] shapes them into the dashboard payload, [`notify`]
//! hands the payload to consumers by value, and [`render`] colors stations
//! over the yellow-to-red gradient from [`colors`].

use anyhow::Result;
use log::*;
use std::collections::HashMap;
use std::path::PathBuf;

pub mod api;
pub mod colors;
pub mod ingest;
pub mod notify;
pub mod render;
pub mod score;
pub mod weights;

pub use colors::{color_for, compute_range, normalize, Range};
pub use weights::{CutPoint, Weights, WeightSplitter};

pub struct ImageConfig {
    pub dest: PathBuf,
    pub width: usize,
    pub height: usize,
}

pub struct RunConfig {
    pub usage: PathBuf,
    pub stations: PathBuf,
    pub span: ingest::DateSpan,
    pub splitter: WeightSplitter,
    pub metric: api::Metric,
    pub image: Option<ImageConfig>,
}

/// Runs the whole pipeline and returns the score payload.
pub fn run(config: &RunConfig) -> Result<api::ScorePayload> {
    let station_records = ingest::load_stations(&config.stations)?;
    let stations: Vec<api::Station> = station_records.iter().map(api::Station::from).collect();
    let coords: HashMap<String, (f64, f64)> = station_records
        .iter()
        .map(|s| (s.abbreviation.clone(), (s.latitude, s.longitude)))
        .collect();

    let records = ingest::load_usage(&config.usage, config.span)?;

    let weights = config.splitter.weights();
    info!(
        "Scoring as {}",
        api::station_scores_query(config.span, weights)
    );
    let scores = score::station_scores(&records, &coords, weights);
    let payload = api::score_payload(config.span, weights, &scores);
    info!("Scored {} stations", payload.count);

    let mut feed = notify::ScoreFeed::new();
    if let Some(image) = &config.image {
        let heatmap_rx = feed.subscribe();
        feed.publish(&payload);
        let delivered = heatmap_rx.recv()?;
        render::render_png(
            &stations,
            &delivered,
            config.metric,
            image.width,
            image.height,
            &image.dest,
        )?;
    } else {
        feed.publish(&payload);
    }

    Ok(payload)
}
