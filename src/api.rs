//! Payload types for the dashboard REST boundary and the query format the
//! score endpoint expects.

use crate::ingest::{DateSpan, StationRecord};
use crate::score::StationScore;
use crate::weights::Weights;
use anyhow::bail;
use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

/// Station entry as served by `/api/stations/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub abbr: String,
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    pub code: String,
}

impl From<&StationRecord> for Station {
    fn from(r: &StationRecord) -> Self {
        Self {
            abbr: r.abbreviation.clone(),
            lat: r.latitude,
            lon: r.longitude,
            name: r.name.clone(),
            code: r.code.clone(),
        }
    }
}

/// One result row of `/api/station-scores/`. The weighted score travels
/// under the wire name `as`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub abbr: String,
    #[serde(rename = "as")]
    pub attractiveness: f64,
    pub board: f64,
    pub eff_dst: f64,
    pub access: f64,
    pub raw_boardings: f64,
    pub raw_eff_dst: f64,
    pub raw_access: f64,
}

/// Envelope of `/api/station-scores/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScorePayload {
    pub count: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weights: Weights,
    pub results: Vec<ScoreRow>,
}

/// Builds the score payload, results ordered best-first (ties by station).
pub fn score_payload(
    span: DateSpan,
    weights: Weights,
    scores: &HashMap<String, StationScore>,
) -> ScorePayload {
    let results: Vec<ScoreRow> = scores
        .iter()
        .map(|(abbr, s)| ScoreRow {
            abbr: abbr.clone(),
            attractiveness: s.attractiveness,
            board: s.board,
            eff_dst: s.eff_dst,
            access: s.access,
            raw_boardings: s.raw_boardings,
            raw_eff_dst: s.raw_eff_dst,
            raw_access: s.raw_access,
        })
        .sorted_by(|x, y| {
            y.attractiveness
                .partial_cmp(&x.attractiveness)
                .unwrap_or(Ordering::Equal)
                .then_with(|| x.abbr.cmp(&y.abbr))
        })
        .collect();
    ScorePayload {
        count: results.len(),
        start_date: span.start,
        end_date: span.end,
        weights,
        results,
    }
}

/// Query string for `/api/station-scores/`; weights are rendered with four
/// decimals, matching what the weight editor submits.
pub fn station_scores_query(span: DateSpan, weights: Weights) -> String {
    format!(
        "/api/station-scores/?start_date={}&end_date={}&w1={:.4}&w2={:.4}&w3={:.4}",
        span.start, span.end, weights.w1, weights.w2, weights.w3
    )
}

/// Which score column drives the heatmap coloring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Attractiveness,
    Board,
    EffDst,
    Access,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Attractiveness => "as",
            Metric::Board => "board",
            Metric::EffDst => "eff_dst",
            Metric::Access => "access",
        }
    }

    pub fn value_of(&self, row: &ScoreRow) -> f64 {
        match self {
            Metric::Attractiveness => row.attractiveness,
            Metric::Board => row.board,
            Metric::EffDst => row.eff_dst,
            Metric::Access => row.access,
        }
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "as" => Metric::Attractiveness,
            "board" => Metric::Board,
            "eff_dst" => Metric::EffDst,
            "access" => Metric::Access,
            other => bail!("unknown metric '{}'", other),
        })
    }
}
