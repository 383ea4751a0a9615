mod display;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use lifeindex_core::{
    Annotation, DEFAULT_LEARNING_RATE, ScoringConfig, ScoringTables, SpecialPattern,
    StrengthFeatures, apply_feedback_loop, build_life_index, build_year_signal, compare_series,
    to_decade_bars,
};
use lifeindex_store::{Chart, export_run, load_annotations, save_annotations};

#[derive(Parser)]
#[command(
    name = "lifeindex",
    version,
    about = "Yearly life index, decade bars and feedback backtests"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a chart and print the yearly index and decade bars.
    Score {
        #[command(flatten)]
        run: RunArgs,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Tune actor weights from annotations and compare against the baseline.
    Backtest {
        #[command(flatten)]
        run: RunArgs,
        #[command(flatten)]
        view: ViewArgs,
        /// JSON array of annotations.
        #[arg(long)]
        annotations: PathBuf,
        #[arg(long, default_value_t = DEFAULT_LEARNING_RATE)]
        learning_rate: f64,
    },
    /// Append one outcome annotation to an annotation file.
    Annotate {
        #[arg(long)]
        annotations: PathBuf,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        label: String,
        /// Outcome text, e.g. "正向 / 大喜" or "负向 / 大悲".
        #[arg(long)]
        outcome: String,
        #[arg(long, default_value_t = 1.0)]
        intensity: f64,
        #[arg(long)]
        note: Option<String>,
    },
    /// List the named special patterns and their actor tables.
    Patterns,
}

#[derive(Args)]
struct RunArgs {
    /// Chart JSON: `{ "years": [...], "eras": [...] }`.
    #[arg(long)]
    chart: PathBuf,
    /// Scoring config JSON; absent fields keep their defaults.
    #[arg(long, env = "LIFEINDEX_CONFIG")]
    config: Option<PathBuf>,
    /// Special pattern name or slug, e.g. 从旺 or follow-strong.
    #[arg(long)]
    pattern: Option<SpecialPattern>,
    #[arg(long)]
    strength: Option<f64>,
    /// JSON file of 得令/得地/得势/通根 features; overrides --strength.
    #[arg(long)]
    strength_features: Option<PathBuf>,
    #[arg(long)]
    base: Option<f64>,
    #[arg(long)]
    cycle: Option<u32>,
    #[arg(long)]
    actor_weight: Option<f64>,
    #[arg(long)]
    relation_trigger: Option<f64>,
}

#[derive(Args)]
struct ViewArgs {
    #[arg(long, default_value_t = 4)]
    ma_short: usize,
    #[arg(long, default_value_t = 9)]
    ma_long: usize,
    #[arg(long, default_value_t = 2)]
    ma_decade_short: usize,
    #[arg(long, default_value_t = 4)]
    ma_decade_long: usize,
    /// Write life_index.parquet and decade_bars.parquet here.
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

impl RunArgs {
    fn scoring_config(&self) -> anyhow::Result<ScoringConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => ScoringConfig::default(),
        };

        if let Some(pattern) = self.pattern {
            config = config.with_special_pattern(pattern);
        }
        if let Some(v) = self.strength {
            config.strength_index = v;
        }
        if let Some(path) = &self.strength_features {
            let features: StrengthFeatures = serde_json::from_str(
                &std::fs::read_to_string(path)
                    .with_context(|| format!("reading strength features {}", path.display()))?,
            )
            .context("parsing strength features")?;
            config.strength_index = features.strength_index();
        }
        if let Some(v) = self.base {
            config.base = v;
        }
        if let Some(v) = self.cycle {
            config.cycle = v;
        }
        if let Some(v) = self.actor_weight {
            config.actor_weight = v;
        }
        if let Some(v) = self.relation_trigger {
            config.relation_trigger = v;
        }
        Ok(config)
    }

    fn chart(&self) -> anyhow::Result<Chart> {
        Chart::load(&self.chart).with_context(|| format!("loading chart {}", self.chart.display()))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    tracing::info!("lifeindex v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Score { run, view } => score(&run, &view),
        Command::Backtest {
            run,
            view,
            annotations,
            learning_rate,
        } => backtest(&run, &view, &annotations, learning_rate),
        Command::Annotate {
            annotations,
            year,
            label,
            outcome,
            intensity,
            note,
        } => annotate(&annotations, year, &label, &outcome, intensity, note),
        Command::Patterns => {
            display::print_patterns();
            Ok(())
        }
    }
}

fn score(run: &RunArgs, view: &ViewArgs) -> anyhow::Result<()> {
    let chart = run.chart()?;
    let config = run.scoring_config()?;
    let tables = ScoringTables::default();

    let signal = build_year_signal(&chart.years, &chart.eras, &config, &tables, None);
    let series = build_life_index(&chart.years, &signal, config.base)?;
    let bars = to_decade_bars(&series);

    display::print_series(&series, view.ma_short, view.ma_long)?;
    display::print_bars(&bars, view.ma_decade_short, view.ma_decade_long)?;

    if let Some(dir) = &view.export_dir {
        export_run(dir, &series, &bars).with_context(|| format!("exporting to {}", dir.display()))?;
        eprintln!("  Exported to {}", dir.display());
    }
    Ok(())
}

fn backtest(
    run: &RunArgs,
    view: &ViewArgs,
    annotations_path: &Path,
    learning_rate: f64,
) -> anyhow::Result<()> {
    let chart = run.chart()?;
    let config = run.scoring_config()?;
    let tables = ScoringTables::default();
    let annotations = load_annotations(annotations_path)
        .with_context(|| format!("loading annotations {}", annotations_path.display()))?;
    if annotations.is_empty() {
        anyhow::bail!("no annotations in {}", annotations_path.display());
    }

    let baseline_signal = build_year_signal(&chart.years, &chart.eras, &config, &tables, None);
    let baseline = build_life_index(&chart.years, &baseline_signal, config.base)?;
    let result = apply_feedback_loop(
        &chart.years,
        &chart.eras,
        &annotations,
        &config,
        &tables,
        learning_rate,
    )?;

    display::print_adjustments(&result.weights);
    display::print_tuned_tables(&tables.actors, &result.weights);
    display::print_comparison(&compare_series(&baseline, &result.series));
    display::print_series(&result.series, view.ma_short, view.ma_long)?;
    display::print_bars(&result.bars, view.ma_decade_short, view.ma_decade_long)?;

    if let Some(dir) = &view.export_dir {
        export_run(dir, &result.series, &result.bars)
            .with_context(|| format!("exporting to {}", dir.display()))?;
        eprintln!("  Exported to {}", dir.display());
    }
    Ok(())
}

fn annotate(
    path: &Path,
    year: i32,
    label: &str,
    outcome: &str,
    intensity: f64,
    note: Option<String>,
) -> anyhow::Result<()> {
    let mut annotations =
        load_annotations(path).with_context(|| format!("loading {}", path.display()))?;

    let note = note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("{year} 年，{label}（{outcome}），影响系数 {intensity:.1}x"));
    annotations.push(Annotation::new(year, label, outcome, intensity).with_note(&note));

    save_annotations(path, &annotations).with_context(|| format!("saving {}", path.display()))?;
    eprintln!("  {} annotation(s) in {}", annotations.len(), path.display());
    Ok(())
}
