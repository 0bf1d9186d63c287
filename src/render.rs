//! Renders scored stations as colored markers on a plain background, the
//! image-file counterpart of the map overlay.

use crate::api::{Metric, ScorePayload, Station};
use crate::colors::{compute_range, normalize, scale_to_color, Range};
use anyhow::{anyhow, bail, Context, Result};
use arrayvec::ArrayVec;
use image::png::PNGEncoder;
use log::*;
use std::collections::HashMap;
use std::path::Path;

const BACKGROUND: [u8; 3] = [0, 0, 0];
const MARKER_RADIUS: i64 = 5;
const PADDING: usize = 16;

fn project(value: f64, range: Range, offset: usize, span: usize) -> usize {
    offset + (normalize(value, range) * span as f64).round() as usize
}

/// Draws one filled circular marker into the RGB buffer.
fn draw_marker(img: &mut [u8], width: usize, height: usize, cx: usize, cy: usize, color: [u8; 3]) {
    for dy in -MARKER_RADIUS..=MARKER_RADIUS {
        for dx in -MARKER_RADIUS..=MARKER_RADIUS {
            if dx * dx + dy * dy > MARKER_RADIUS * MARKER_RADIUS {
                continue;
            }
            let x = cx as i64 + dx;
            let y = cy as i64 + dy;
            if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                continue;
            }
            let at = (y as usize * width + x as usize) * 3;
            img[at..at + 3].copy_from_slice(&color);
        }
    }
}

/// Renders the chosen metric of a score payload over the station layout.
///
/// Stations are placed by linear lat/lon projection over the padded
/// bounding box of the drawn set; marker colors come from the yellow-to-red
/// gradient over the metric's min/max range. Stations without a finite
/// metric value, and scored stations with no known coordinates, are
/// skipped like the map overlay skips them.
pub fn render_heatmap(
    stations: &[Station],
    payload: &ScorePayload,
    metric: Metric,
    width: usize,
    height: usize,
) -> Result<(usize, usize, Vec<u8>)> {
    if width <= 2 * PADDING || height <= 2 * PADDING {
        bail!("image size {}x{} is too small to draw into", width, height);
    }

    let values: HashMap<&str, f64> = payload
        .results
        .iter()
        .map(|r| (r.abbr.as_str(), metric.value_of(r)))
        .filter(|(_, v)| v.is_finite())
        .collect();
    let placed: Vec<(&Station, f64)> = stations
        .iter()
        .filter_map(|s| values.get(s.abbr.as_str()).map(|v| (s, *v)))
        .collect();
    if placed.is_empty() {
        bail!("no stations with a {} value to draw", metric.name());
    }

    let lat_range = compute_range(placed.iter().map(|(s, _)| Some(s.lat)))
        .ok_or_else(|| anyhow!("station latitudes are not finite"))?;
    let lon_range = compute_range(placed.iter().map(|(s, _)| Some(s.lon)))
        .ok_or_else(|| anyhow!("station longitudes are not finite"))?;
    let value_range = compute_range(placed.iter().map(|(_, v)| Some(*v)))
        .ok_or_else(|| anyhow!("no finite {} values", metric.name()))?;

    let mut img: Vec<u8> = (0..width * height)
        .flat_map(|_| ArrayVec::from(BACKGROUND))
        .collect();

    let x_span = width - 1 - 2 * PADDING;
    let y_span = height - 1 - 2 * PADDING;
    for (station, value) in &placed {
        let x = project(station.lon, lon_range, PADDING, x_span);
        // Image rows grow downwards, latitude grows upwards.
        let y = height - 1 - project(station.lat, lat_range, PADDING, y_span);
        draw_marker(
            &mut img,
            width,
            height,
            x,
            y,
            scale_to_color(*value, value_range),
        );
    }

    info!(
        "Rendered {} of {} stations by {} into {}x{}",
        placed.len(),
        stations.len(),
        metric.name(),
        width,
        height
    );
    Ok((width, height, img))
}

pub fn save_image<P: AsRef<Path>>(
    width: usize,
    height: usize,
    imgdata: &[u8],
    dest: P,
) -> Result<()> {
    let dest = dest.as_ref();
    info!("Saving {} {}x{}", dest.display(), width, height);
    let f = std::fs::File::create(dest).with_context(|| format!("creating {}", dest.display()))?;
    PNGEncoder::new(f)
        .encode(imgdata, width as u32, height as u32, image::ColorType::Rgb8)
        .with_context(|| format!("encoding {}", dest.display()))
}

pub fn render_png<P: AsRef<Path>>(
    stations: &[Station],
    payload: &ScorePayload,
    metric: Metric,
    width: usize,
    height: usize,
    dest: P,
) -> Result<()> {
    let (width, height, img) = render_heatmap(stations, payload, metric, width, height)?;
    save_image(width, height, &img, dest)
}
