use crate::colors::{compute_range, normalize};
use crate::ingest::UsageRecord;
use crate::weights::Weights;
use log::*;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine great-circle distance between two lat/lon points.
pub fn geo_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let p1 = lat1.to_radians();
    let p2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlmb = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dlmb / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Per-station attractiveness metrics. The `board`, `eff_dst` and `access`
/// fields are min/max normalized to [0,1] within the scored scope; the
/// `raw_*` fields keep the unnormalized values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StationScore {
    pub board: f64,
    pub eff_dst: f64,
    pub access: f64,
    pub attractiveness: f64,
    pub raw_boardings: f64,
    pub raw_eff_dst: f64,
    pub raw_access: f64,
}

fn minmax_norm(values: &HashMap<String, f64>) -> HashMap<String, f64> {
    match compute_range(values.values().map(|v| Some(*v))) {
        None => HashMap::new(),
        Some(range) => values
            .iter()
            .map(|(k, v)| (k.clone(), normalize(*v, range)))
            .collect(),
    }
}

/// Scores stations from already-filtered OD records.
///
/// Three metrics per source station, each min/max normalized within the
/// scored scope, combined as `w1*board + w2*eff_dst + w3*access`:
/// - boardings: total outbound passengers,
/// - effective destinations: `exp(H)` of the Shannon entropy of the
///   station's outbound flow distribution,
/// - access: inbound volume of every other station discounted by
///   `1 / (1 + dist_km)`.
///
/// Rows with a missing endpoint, non-positive passengers, or equal source
/// and destination are skipped. Only stations with known coordinates are
/// scored.
pub fn station_scores(
    records: &[UsageRecord],
    coords: &HashMap<String, (f64, f64)>,
    weights: Weights,
) -> HashMap<String, StationScore> {
    let mut boardings_by_src: HashMap<String, f64> = HashMap::new();
    let mut inbound_by_dst: HashMap<String, f64> = HashMap::new();
    let mut flow_by_src_dst: HashMap<String, HashMap<String, f64>> = HashMap::new();

    for r in records {
        let passengers = r.passengers as f64;
        if r.source.is_empty() || r.destination.is_empty() || passengers <= 0.0 {
            continue;
        }
        if r.source == r.destination {
            continue;
        }
        *boardings_by_src.entry(r.source.clone()).or_insert(0.0) += passengers;
        *inbound_by_dst.entry(r.destination.clone()).or_insert(0.0) += passengers;
        *flow_by_src_dst
            .entry(r.source.clone())
            .or_insert_with(HashMap::new)
            .entry(r.destination.clone())
            .or_insert(0.0) += passengers;
    }

    let stations_in_scope: HashSet<String> = boardings_by_src
        .keys()
        .chain(inbound_by_dst.keys())
        .chain(flow_by_src_dst.keys())
        .filter(|abbr| coords.contains_key(*abbr))
        .cloned()
        .collect();
    if stations_in_scope.is_empty() {
        debug!("No scorable stations in the filtered records");
        return HashMap::new();
    }

    // Effective destinations: H_i = -sum p_ij ln(p_ij), D_i = exp(H_i).
    let mut raw_eff_dst: HashMap<String, f64> = HashMap::new();
    for src in &stations_in_scope {
        let effective = match flow_by_src_dst.get(src) {
            Some(flows) => {
                let total: f64 = flows.values().sum();
                if total > 0.0 {
                    let mut entropy = 0.0;
                    for f in flows.values() {
                        let p = f / total;
                        if p > 0.0 {
                            entropy -= p * p.ln();
                        }
                    }
                    entropy.exp()
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        raw_eff_dst.insert(src.clone(), effective);
    }

    // Access: inbound volume everywhere else, discounted by distance.
    let raw_access: HashMap<String, f64> = stations_in_scope
        .par_iter()
        .map(|src| {
            let (src_lat, src_lon) = coords[src];
            let acc = inbound_by_dst
                .iter()
                .filter(|(dst, _)| *dst != src)
                .filter_map(|(dst, inbound)| {
                    let (dst_lat, dst_lon) = *coords.get(dst)?;
                    let dist = geo_distance_km(src_lat, src_lon, dst_lat, dst_lon);
                    Some(inbound / (1.0 + dist))
                })
                .sum();
            (src.clone(), acc)
        })
        .collect();

    let raw_boardings: HashMap<String, f64> = boardings_by_src
        .iter()
        .filter(|(abbr, _)| stations_in_scope.contains(*abbr))
        .map(|(abbr, v)| (abbr.clone(), *v))
        .collect();

    let board_norm = minmax_norm(&raw_boardings);
    let eff_dst_norm = minmax_norm(&raw_eff_dst);
    let access_norm = minmax_norm(&raw_access);

    stations_in_scope
        .into_iter()
        .map(|abbr| {
            let b = board_norm.get(&abbr).copied().unwrap_or(0.0);
            let d = eff_dst_norm.get(&abbr).copied().unwrap_or(0.0);
            let a = access_norm.get(&abbr).copied().unwrap_or(0.0);
            let score = StationScore {
                board: b,
                eff_dst: d,
                access: a,
                attractiveness: weights.w1 * b + weights.w2 * d + weights.w3 * a,
                raw_boardings: raw_boardings.get(&abbr).copied().unwrap_or(0.0),
                raw_eff_dst: raw_eff_dst.get(&abbr).copied().unwrap_or(0.0),
                raw_access: raw_access.get(&abbr).copied().unwrap_or(0.0),
            };
            (abbr, score)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn record(source: &str, destination: &str, passengers: i64) -> UsageRecord {
        UsageRecord {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            hour: 8,
            source: source.to_string(),
            destination: destination.to_string(),
            passengers,
        }
    }

    fn grid_coords() -> HashMap<String, (f64, f64)> {
        vec![
            ("AAAA", (37.0, -122.0)),
            ("BBBB", (37.1, -122.0)),
            ("CCCC", (37.2, -122.1)),
            ("DDDD", (37.3, -122.2)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = geo_distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.195).abs() < 0.01, "got {}", d);
        assert_eq!(geo_distance_km(37.0, -122.0, 37.0, -122.0), 0.0);
    }

    #[test]
    fn self_loops_and_nonpositive_counts_score_nothing() {
        let records = vec![
            record("AAAA", "AAAA", 50),
            record("AAAA", "BBBB", 0),
            record("BBBB", "AAAA", -3),
        ];
        let scores = station_scores(&records, &grid_coords(), Weights::equal_thirds());
        assert_eq!(scores, HashMap::new());
    }

    #[test]
    fn stations_without_coordinates_are_out_of_scope() {
        let records = vec![record("AAAA", "ZZZZ", 10)];
        let scores = station_scores(&records, &grid_coords(), Weights::equal_thirds());
        // ZZZZ is unknown; only AAAA is scored.
        assert_eq!(scores.len(), 1);
        assert!(scores.contains_key("AAAA"));
    }

    #[test]
    fn single_station_scope_degenerates_to_zero() {
        let records = vec![record("AAAA", "ZZZZ", 10)];
        let scores = station_scores(&records, &grid_coords(), Weights::equal_thirds());
        let s = scores["AAAA"];
        assert_eq!(s.board, 0.0);
        assert_eq!(s.eff_dst, 0.0);
        assert_eq!(s.access, 0.0);
        assert_eq!(s.attractiveness, 0.0);
        assert_eq!(s.raw_boardings, 10.0);
    }

    #[test]
    fn equal_flows_give_entropy_destination_count() {
        let records = vec![
            record("AAAA", "BBBB", 10),
            record("AAAA", "CCCC", 10),
            record("AAAA", "DDDD", 10),
        ];
        let scores = station_scores(&records, &grid_coords(), Weights::equal_thirds());
        assert!((scores["AAAA"].raw_eff_dst - 3.0).abs() < 1e-9);
        // A destination-only station has no outbound flows.
        assert_eq!(scores["BBBB"].raw_eff_dst, 0.0);
    }

    #[test]
    fn attractiveness_is_the_weighted_metric_sum() {
        let records = vec![
            record("AAAA", "BBBB", 120),
            record("AAAA", "CCCC", 40),
            record("BBBB", "AAAA", 80),
            record("CCCC", "DDDD", 15),
            record("DDDD", "AAAA", 60),
        ];
        let weights = Weights {
            w1: 0.5,
            w2: 0.3,
            w3: 0.2,
        };
        let scores = station_scores(&records, &grid_coords(), weights);
        assert_eq!(scores.len(), 4);
        for s in scores.values() {
            assert!((0.0..=1.0).contains(&s.board));
            assert!((0.0..=1.0).contains(&s.eff_dst));
            assert!((0.0..=1.0).contains(&s.access));
            let expected = 0.5 * s.board + 0.3 * s.eff_dst + 0.2 * s.access;
            assert!((s.attractiveness - expected).abs() < 1e-12);
        }
        // AAAA boards the most, so it tops the boardings scale.
        assert_eq!(scores["AAAA"].board, 1.0);
    }
}
