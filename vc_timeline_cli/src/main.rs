use std::fs::{self, File};
use std::io::{self, Write};
use std::panic;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use chrono::SecondsFormat;
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use plotters::prelude::{BitMapBackend, SVGBackend};
use rayon::prelude::*;
use serde_json::json;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use vc_timeline::{
    BinLayout, ChartConfig, Color, ContestBundle, ContestSummary, ScoreChart, SeriesKey,
    StepSeries, Theme, TimelineChart,
};

mod plot;

use plot::PlottersSurface;

#[derive(Parser, Debug)]
#[command(author, version, about = "Virtual contest score and timeline charts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write best-so-far step series as CSV
    Series(TableArgs),
    /// Write submission density bins as CSV
    Bins(TableArgs),
    /// Render score and timeline charts to PNG or SVG
    Render(RenderArgs),
    /// Print standings summaries as JSON lines
    Summary(SummaryArgs),
}

#[derive(Parser, Debug)]
struct TableArgs {
    /// Contest bundle JSON files
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,

    /// Output CSV path, `-` for stdout
    #[arg(short, long, default_value = "-", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Enable debug logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Contest bundle JSON files
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,

    /// Directory for rendered images
    #[arg(long, default_value = ".", value_hint = ValueHint::DirPath)]
    out_dir: PathBuf,

    /// Write SVG instead of PNG
    #[arg(long, action = ArgAction::SetTrue)]
    svg: bool,

    /// Use the dark theme
    #[arg(long, action = ArgAction::SetTrue)]
    dark: bool,

    /// Chart width in CSS pixels
    #[arg(long, default_value_t = 960.0)]
    width: f64,

    /// Score chart height in CSS pixels
    #[arg(long, default_value_t = 420.0)]
    height: f64,

    /// Timeline chart height in CSS pixels
    #[arg(long, default_value_t = 96.0)]
    timeline_height: f64,

    /// Device pixel ratio
    #[arg(long, default_value_t = 2.0)]
    pixel_ratio: f64,

    /// Hidden series, e.g. `total,2`
    #[arg(long)]
    hide: Option<String>,

    /// Override the total-series accent (`#rrggbb`)
    #[arg(long)]
    accent: Option<String>,

    /// JSON file overriding chart config defaults
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct SummaryArgs {
    /// Contest bundle JSON files
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbose = match &cli.command {
        Command::Series(args) | Command::Bins(args) => args.verbose,
        Command::Render(args) => args.verbose,
        Command::Summary(args) => args.verbose,
    };
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Series(args) => handle_series(args),
        Command::Bins(args) => handle_bins(args),
        Command::Render(args) => handle_render(args),
        Command::Summary(args) => handle_summary(args),
    }
}

struct LoadedContest {
    stem: String,
    bundle: ContestBundle,
}

fn load_bundle(path: &Path) -> Result<LoadedContest> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let bundle = ContestBundle::from_json(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "contest".to_string());
    Ok(LoadedContest { stem, bundle })
}

/// Parse inputs in parallel; unreadable files are reported and skipped.
fn load_all(inputs: &[PathBuf]) -> Result<Vec<LoadedContest>> {
    let t_parse = Instant::now();
    let results: Vec<(PathBuf, Result<LoadedContest>)> = inputs
        .par_iter()
        .map(|path| (path.clone(), load_bundle(path)))
        .collect();

    let mut loaded = Vec::with_capacity(results.len());
    for (path, result) in results {
        match result {
            Ok(contest) => loaded.push(contest),
            Err(err) => warn!("Skipping {}: {:#}", path.display(), err),
        }
    }
    debug!(
        "Parse stage: {:.1} ms ({} of {} inputs)",
        t_parse.elapsed().as_secs_f64() * 1000.0,
        loaded.len(),
        inputs.len()
    );
    if loaded.is_empty() {
        bail!("no readable contest bundles");
    }
    Ok(loaded)
}

fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdout().lock()));
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(Box::new(file))
}

fn handle_series(args: TableArgs) -> Result<()> {
    let contests = load_all(&args.inputs)?;
    let mut writer = csv::Writer::from_writer(open_output(&args.output)?);
    write_series_rows(&contests, &mut writer)?;
    if args.output.as_os_str() != "-" {
        info!("Wrote series CSV: {}", args.output.display());
    }
    Ok(())
}

fn write_series_rows<W: Write>(
    contests: &[LoadedContest],
    writer: &mut csv::Writer<W>,
) -> Result<()> {
    writer.write_record(["file", "series", "time", "elapsed_min", "value"])?;
    for contest in contests {
        let record = &contest.bundle.contest;
        let chart = ScoreChart::new(&contest.bundle, ChartConfig::default());
        let named = chart
            .series
            .per_problem
            .iter()
            .map(|(index, series)| (format!("p{index}"), series))
            .chain(std::iter::once(("total".to_string(), &chart.series.total)));
        for (name, series) in named {
            write_steps(writer, &contest.stem, &name, record.started_at, series)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_steps<W: Write>(
    writer: &mut csv::Writer<W>,
    stem: &str,
    name: &str,
    start: vc_timeline::Timestamp,
    series: &StepSeries,
) -> Result<()> {
    for point in series.points() {
        let elapsed = (point.time - start).num_milliseconds() as f64 / 60_000.0;
        writer.write_record([
            stem.to_string(),
            name.to_string(),
            point.time.to_rfc3339_opts(SecondsFormat::Secs, true),
            format!("{:.2}", elapsed),
            format!("{}", point.value),
        ])?;
    }
    Ok(())
}

fn handle_bins(args: TableArgs) -> Result<()> {
    let contests = load_all(&args.inputs)?;
    let mut writer = csv::Writer::from_writer(open_output(&args.output)?);
    write_bin_rows(&contests, &mut writer)?;
    if args.output.as_os_str() != "-" {
        info!("Wrote bins CSV: {}", args.output.display());
    }
    Ok(())
}

fn write_bin_rows<W: Write>(contests: &[LoadedContest], writer: &mut csv::Writer<W>) -> Result<()> {
    writer.write_record(["file", "bin", "start_min", "end_min", "count"])?;
    for contest in contests {
        let Some(layout) = contest
            .bundle
            .meta
            .planned_minutes()
            .and_then(BinLayout::for_duration)
        else {
            warn!("{}: no planned duration, no bins written", contest.stem);
            continue;
        };
        let chart = TimelineChart::new(&contest.bundle, ChartConfig::default());
        for (index, count) in chart.bins.iter().enumerate() {
            let (from, to) = layout.span_minutes(index);
            writer.write_record([
                contest.stem.clone(),
                index.to_string(),
                format!("{from}"),
                format!("{to}"),
                count.to_string(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn handle_summary(args: SummaryArgs) -> Result<()> {
    let contests = load_all(&args.inputs)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for contest in &contests {
        let summary = ContestSummary::build(&contest.bundle);
        let line = json!({ "file": contest.stem, "summary": summary });
        writeln!(out, "{}", serde_json::to_string(&line)?)?;
    }
    Ok(())
}

/// Parse `--hide`, e.g. `total,2,3`.
fn parse_hidden(input: &str) -> Result<Vec<SeriesKey>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            if token.eq_ignore_ascii_case("total") {
                return Ok(SeriesKey::Total);
            }
            let index = token
                .trim_start_matches(['p', 'P'])
                .parse::<u32>()
                .map_err(|_| anyhow!("invalid series '{token}' (expected `total` or a problem number)"))?;
            if index == 0 {
                bail!("problem numbers start at 1");
            }
            Ok(SeriesKey::Problem(index))
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChartKind {
    Png,
    Svg,
}

impl ChartKind {
    fn extension(self) -> &'static str {
        match self {
            ChartKind::Png => "png",
            ChartKind::Svg => "svg",
        }
    }
}

#[derive(Clone, Debug)]
struct RenderOptions {
    kind: ChartKind,
    theme: Theme,
    size: (f64, f64),
    timeline_height: f64,
    pixel_ratio: f64,
    hidden: Vec<SeriesKey>,
    config: ChartConfig,
    out_dir: PathBuf,
}

fn handle_render(args: RenderArgs) -> Result<()> {
    let mut config = match args.config.as_ref() {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            ChartConfig::from_json(&text)
                .with_context(|| format!("invalid chart config {}", path.display()))?
        }
        None => ChartConfig::default(),
    };
    if let Some(hex) = args.accent.as_deref() {
        config.palette.total =
            Color::from_hex(hex).ok_or_else(|| anyhow!("invalid --accent color '{hex}'"))?;
    }
    let hidden = match args.hide.as_deref() {
        Some(list) => parse_hidden(list)?,
        None => Vec::new(),
    };
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let opts = RenderOptions {
        kind: if args.svg { ChartKind::Svg } else { ChartKind::Png },
        theme: Theme::from_dark_flag(args.dark),
        size: (args.width, args.height),
        timeline_height: args.timeline_height,
        pixel_ratio: args.pixel_ratio,
        hidden,
        config,
        out_dir: args.out_dir.clone(),
    };

    let contests = load_all(&args.inputs)?;
    let t_render = Instant::now();
    let failures: usize = contests
        .par_iter()
        .map(|contest| {
            let mut failed = 0;
            for (label, result) in [
                ("score", render_guard(|| render_score(contest, &opts))),
                ("timeline", render_guard(|| render_timeline(contest, &opts))),
            ] {
                match result {
                    Ok(path) => info!("Wrote {} chart: {}", label, path.display()),
                    Err(err) => {
                        warn!("Skipping {} render ({}): {}", label, contest.stem, err);
                        failed += 1;
                    }
                }
            }
            failed
        })
        .sum();
    info!(
        "Rendered {} contests in {:.1} ms ({} failures)",
        contests.len(),
        t_render.elapsed().as_secs_f64() * 1000.0,
        failures
    );
    Ok(())
}

fn render_guard(render: impl FnOnce() -> Result<PathBuf, String>) -> Result<PathBuf, String> {
    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| "plotting backend panicked".to_string())?
}

fn output_path(opts: &RenderOptions, stem: &str, chart: &str) -> PathBuf {
    opts.out_dir
        .join(format!("{stem}_{chart}.{}", opts.kind.extension()))
}

fn render_score(contest: &LoadedContest, opts: &RenderOptions) -> Result<PathBuf, String> {
    let mut chart = ScoreChart::new(&contest.bundle, opts.config.clone());
    if chart.state.mapper().is_none() {
        return Err("no planned duration".to_string());
    }
    chart.state.resize(opts.size, opts.pixel_ratio);
    for key in &opts.hidden {
        if !chart.state.visibility.set(*key, false) {
            debug!(?key, "hidden series not present in {}", contest.stem);
        }
    }
    let path = output_path(opts, &contest.stem, "score");
    let backing = chart.state.backing_size();
    match opts.kind {
        ChartKind::Png => {
            let mut surface =
                PlottersSurface::new(BitMapBackend::new(&path, backing), opts.theme.background());
            chart.compose(&mut surface, opts.theme);
            surface.finish()?;
        }
        ChartKind::Svg => {
            let mut surface =
                PlottersSurface::new(SVGBackend::new(&path, backing), opts.theme.background());
            chart.compose(&mut surface, opts.theme);
            surface.finish()?;
        }
    }
    Ok(path)
}

fn render_timeline(contest: &LoadedContest, opts: &RenderOptions) -> Result<PathBuf, String> {
    let mut chart = TimelineChart::new(&contest.bundle, opts.config.clone());
    if chart.state.mapper().is_none() {
        return Err("no planned duration".to_string());
    }
    chart
        .state
        .resize((opts.size.0, opts.timeline_height), opts.pixel_ratio);
    let path = output_path(opts, &contest.stem, "timeline");
    let backing = chart.state.backing_size();
    match opts.kind {
        ChartKind::Png => {
            let mut surface =
                PlottersSurface::new(BitMapBackend::new(&path, backing), opts.theme.background());
            chart.compose(&mut surface, opts.theme);
            surface.finish()?;
        }
        ChartKind::Svg => {
            let mut surface =
                PlottersSurface::new(SVGBackend::new(&path, backing), opts.theme.background());
            chart.compose(&mut surface, opts.theme);
            surface.finish()?;
        }
    }
    Ok(path)
}
