use anyhow::{anyhow, Result};
use clap::{App, Arg};
use transit_heatmap::api::Metric;
use transit_heatmap::ingest::DateSpan;
use transit_heatmap::{CutPoint, ImageConfig, RunConfig, WeightSplitter};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");
const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

fn parse_size(s: &str) -> Result<(usize, usize)> {
    let mut parts = s.splitn(2, 'x');
    let width = parts
        .next()
        .ok_or_else(|| anyhow!("invalid size '{}'", s))?
        .parse()?;
    let height = parts
        .next()
        .ok_or_else(|| anyhow!("invalid size '{}', expected WIDTHxHEIGHT", s))?
        .parse()?;
    Ok((width, height))
}

fn main() -> Result<()> {
    let matches = App::new(NAME)
        .version(VERSION)
        .author(AUTHOR)
        .about("Scores transit stations from OD usage data and renders a station heatmap")
        .arg(
            Arg::with_name("USAGE")
                .help("Usage CSV file, or a directory of split .csv/.csv.gz files")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("stations")
                .short("s")
                .long("stations")
                .takes_value(true)
                .required(true)
                .help("Stations CSV file"),
        )
        .arg(
            Arg::with_name("start-date")
                .long("start-date")
                .takes_value(true)
                .required(true)
                .help("Inclusive start date, YYYY-MM-DD"),
        )
        .arg(
            Arg::with_name("end-date")
                .long("end-date")
                .takes_value(true)
                .required(true)
                .help("Inclusive end date, YYYY-MM-DD"),
        )
        .arg(
            Arg::with_name("cut1")
                .long("cut1")
                .takes_value(true)
                .help("Position of the first weight cut point in [0,1]"),
        )
        .arg(
            Arg::with_name("cut2")
                .long("cut2")
                .takes_value(true)
                .help("Position of the second weight cut point in [0,1]"),
        )
        .arg(
            Arg::with_name("metric")
                .short("m")
                .long("metric")
                .takes_value(true)
                .default_value("as")
                .possible_values(&["as", "board", "eff_dst", "access"])
                .help("Score column driving the heatmap colors"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("Write the station heatmap PNG here"),
        )
        .arg(
            Arg::with_name("size")
                .long("size")
                .takes_value(true)
                .default_value("1024x768")
                .help("Heatmap image size as WIDTHxHEIGHT"),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .help("Print the full score payload as JSON"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Silence all output"),
        )
        .get_matches();

    let verbose = matches.occurrences_of("verbose") as usize;
    let quiet = matches.is_present("quiet");
    stderrlog::new()
        .module(module_path!())
        .module("transit_heatmap")
        .quiet(quiet)
        .verbosity(verbose)
        .init()
        .unwrap();

    let span = DateSpan::new(
        matches.value_of("start-date").unwrap().parse()?,
        matches.value_of("end-date").unwrap().parse()?,
    )?;

    let mut splitter = WeightSplitter::new();
    if let Some(pos) = matches.value_of("cut1") {
        splitter.set_cut_point(CutPoint::First, pos.parse()?);
    }
    if let Some(pos) = matches.value_of("cut2") {
        splitter.set_cut_point(CutPoint::Second, pos.parse()?);
    }

    let metric: Metric = matches.value_of("metric").unwrap().parse()?;
    let image = match matches.value_of("output") {
        Some(dest) => {
            let (width, height) = parse_size(matches.value_of("size").unwrap())?;
            Some(ImageConfig {
                dest: dest.into(),
                width,
                height,
            })
        }
        None => None,
    };

    let config = RunConfig {
        usage: matches.value_of("USAGE").unwrap().into(),
        stations: matches.value_of("stations").unwrap().into(),
        span,
        splitter,
        metric,
        image,
    };
    let payload = transit_heatmap::run(&config)?;

    if matches.is_present("json") {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "Computed {} stations for {} to {} (w1={:.2}, w2={:.2}, w3={:.2})",
            payload.count,
            payload.start_date,
            payload.end_date,
            payload.weights.w1,
            payload.weights.w2,
            payload.weights.w3
        );
        println!(
            "{:<8} {:>8} {:>8} {:>8} {:>8}",
            "Station", "AS", "Board", "EffDst", "Access"
        );
        for row in payload.results.iter().take(20) {
            println!(
                "{:<8} {:>8.3} {:>8.3} {:>8.3} {:>8.3}",
                row.abbr, row.attractiveness, row.board, row.eff_dst, row.access
            );
        }
        if payload.count > 20 {
            println!("Showing top 20 of {}.", payload.count);
        }
    }
    Ok(())
}
