use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use flate2::read::GzDecoder;
use log::*;
use serde::Deserialize;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use walkdir::WalkDir;

/// Inclusive date range used to filter usage records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            bail!("start date {} is after end date {}", start, end);
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One origin/destination row of the yearly usage table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub hour: u32,
    pub source: String,
    pub destination: String,
    pub passengers: i64,
}

/// One row of the stations table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StationRecord {
    pub code: String,
    pub name: String,
    pub abbreviation: String,
    pub latitude: f64,
    pub longitude: f64,
}

pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Box<dyn Read>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(match path.extension() {
        Some(ext) if ext == OsStr::new("gz") => Box::new(GzDecoder::new(file)),
        _ => Box::new(file),
    })
}

fn read_file<T: Read>(file: T) -> csv::Reader<T> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file)
}

/// Reads usage rows from a CSV stream, keeping only rows inside `span`.
pub fn read_usage<R: Read>(reader: R, span: DateSpan) -> Result<Vec<UsageRecord>> {
    let mut records = Vec::new();
    for row in read_file(reader).into_deserialize() {
        let record: UsageRecord = row.context("parsing usage record")?;
        if span.contains(record.date) {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn read_stations<R: Read>(reader: R) -> Result<Vec<StationRecord>> {
    read_file(reader)
        .into_deserialize()
        .map(|row| row.context("parsing station record"))
        .collect()
}

pub fn load_stations<P: AsRef<Path>>(path: P) -> Result<Vec<StationRecord>> {
    let path = path.as_ref();
    info!("Loading stations: {}", path.display());
    let stations = read_stations(open_file(path)?)?;
    info!("Loaded {} stations", stations.len());
    Ok(stations)
}

/// Loads usage rows from a CSV file, or from every `.csv`/`.csv.gz` file
/// under a directory (the loader splits large exports into per-chunk files).
pub fn load_usage<P: AsRef<Path>>(path: P, span: DateSpan) -> Result<Vec<UsageRecord>> {
    let path = path.as_ref();
    let mut records = Vec::new();
    if path.is_dir() {
        let exts = [".csv", ".csv.gz"];
        for entry in WalkDir::new(path) {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if exts.iter().any(|ext| name.ends_with(ext)) {
                info!("Loading usage: {}", entry.path().display());
                records.extend(read_usage(open_file(entry.path())?, span)?);
            }
        }
    } else {
        info!("Loading usage: {}", path.display());
        records = read_usage(open_file(path)?, span)?;
    }
    info!(
        "Loaded {} usage records between {} and {}",
        records.len(),
        span.start,
        span.end
    );
    Ok(records)
}
