use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{bail, Context, IntoDiagnostic, Result};

use cadence_core::{CadenceConfig, OutputFormat};
use cadence_engine::composer::{
    AnalysisInput, InsightBundle, InsightComposer, InsightKind, InsightSection,
};

#[derive(Parser)]
#[command(
    name = "cadence",
    version,
    about = "Engineering activity insight engine",
    long_about = "Cadence turns pre-queried engineering activity records into structured\n\
                   insights: per-metric trends, statistical anomalies, collaboration\n\
                   networks, and composite health scores, with rule-driven observations.\n\n\
                   Examples:\n  \
                     cadence analyze --input snapshot.json           Run every insight type\n  \
                     cadence analyze --input s.json --insights trends,health\n  \
                     cadence analyze --input s.json --format json    Machine-readable bundle\n  \
                     cadence init                                    Write a default .cadence.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .cadence.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze an activity snapshot and print the insight bundle
    #[command(long_about = "Analyze an activity snapshot and print the insight bundle.\n\n\
        The snapshot is a JSON file holding one scope's pre-queried records:\n\
        metric records per period, interaction events, and optional health\n\
        aggregates. Unknown insight names are rejected rather than skipped.\n\n\
        Examples:\n  cadence analyze --input snapshot.json\n  \
        cadence analyze --input snapshot.json --insights anomalies --format json")]
    Analyze {
        /// Path to the snapshot JSON file
        #[arg(long)]
        input: PathBuf,

        /// Comma-separated insight types (default: all)
        #[arg(long)]
        insights: Option<String>,
    },
    /// Write a default .cadence.toml to the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    human_panic::setup_panic!();
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { input, insights } => {
            let config = load_config(cli.config.as_deref())?;
            run_analyze(&config, &input, insights.as_deref(), cli.format)
        }
        Command::Init { force } => run_init(force),
    }
}

fn load_config(path: Option<&Path>) -> Result<CadenceConfig> {
    match path {
        Some(path) => CadenceConfig::from_file(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to load config from {}", path.display())),
        None => {
            let default_path = Path::new(".cadence.toml");
            if default_path.exists() {
                CadenceConfig::from_file(default_path)
                    .into_diagnostic()
                    .wrap_err("failed to load .cadence.toml")
            } else {
                Ok(CadenceConfig::default())
            }
        }
    }
}

fn run_analyze(
    config: &CadenceConfig,
    input: &Path,
    insights: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read snapshot {}", input.display()))?;
    let snapshot: AnalysisInput = serde_json::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("snapshot {} is not a valid analysis input", input.display()))?;

    let kinds = match insights {
        Some(list) => InsightKind::parse_list(list).into_diagnostic()?,
        None => InsightKind::ALL.to_vec(),
    };
    if kinds.is_empty() {
        bail!("no insight types requested");
    }

    let composer = InsightComposer::new(config.clone());
    let bundle = composer.compose(&snapshot, &kinds);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&bundle).into_diagnostic()?;
            println!("{json}");
        }
        OutputFormat::Text => print_text(&bundle),
        OutputFormat::Markdown => print_markdown(&bundle),
    }
    Ok(())
}

fn print_text(bundle: &InsightBundle) {
    println!(
        "Insights for {} ({} → {})",
        bundle.scope,
        bundle.date_range.start.format("%Y-%m-%d"),
        bundle.date_range.end.format("%Y-%m-%d")
    );

    if let Some(section) = &bundle.trends {
        println!("\nTrends");
        match section {
            InsightSection::Ready { data } => {
                for trend in &data.trends {
                    let volatility_note = if trend.high_volatility {
                        "  [volatile]"
                    } else {
                        ""
                    };
                    println!(
                        "  {:<20} slope {:+.3}  avg {:.2}  {}{}",
                        trend.summary.metric.to_string(),
                        trend.summary.slope,
                        trend.summary.average,
                        trend.direction,
                        volatility_note
                    );
                }
            }
            other => print_unready(other),
        }
    }

    if let Some(section) = &bundle.anomalies {
        println!("\nAnomalies");
        match section {
            InsightSection::Ready { data } if data.anomalies.is_empty() => {
                println!("  none detected across {} metrics", data.metrics_scanned);
            }
            InsightSection::Ready { data } => {
                for anomaly in &data.anomalies {
                    println!(
                        "  {}  {:<20} value {:.1} vs expected {:.1}  ({} {})",
                        anomaly.period.format("%Y-%m-%d"),
                        anomaly.metric.to_string(),
                        anomaly.value,
                        anomaly.expected,
                        anomaly.severity,
                        anomaly.direction
                    );
                }
            }
            other => print_unready(other),
        }
    }

    if let Some(section) = &bundle.collaboration {
        println!("\nCollaboration");
        match section {
            InsightSection::Ready { data } => {
                println!(
                    "  {} counterparts, {:.1} interactions each on average",
                    data.distinct_counterparts, data.avg_interactions
                );
                for link in &data.counterparts {
                    println!(
                        "  {:<16} reviews given {:<3} received {:<3} comments {}",
                        link.actor.display_name,
                        link.reviews_given,
                        link.reviews_received,
                        link.comments
                    );
                }
            }
            other => print_unready(other),
        }
    }

    if let Some(section) = &bundle.health {
        println!("\nHealth");
        match section {
            InsightSection::Ready { data } => {
                println!(
                    "  overall {}  (activity {}, staleness {}, responsiveness {}, merge rate {})",
                    data.overall,
                    data.subscores.activity,
                    data.subscores.staleness,
                    data.subscores.responsiveness,
                    data.subscores.merge_rate
                );
            }
            other => print_unready(other),
        }
    }

    if !bundle.observations.is_empty() {
        println!("\nObservations");
        for observation in &bundle.observations {
            println!("  - {}", observation.insight);
            if let Some(recommendation) = &observation.recommendation {
                println!("    recommendation: {recommendation}");
            }
        }
    }
}

fn print_unready<T>(section: &InsightSection<T>) {
    match section {
        InsightSection::Ready { .. } => {}
        InsightSection::InsufficientData { required, actual } => {
            println!("  insufficient data: {actual} of {required} required points");
        }
        InsightSection::Failed { error } => {
            println!("  failed: {error}");
        }
    }
}

fn print_markdown(bundle: &InsightBundle) {
    println!(
        "# Insights for {} ({} → {})",
        bundle.scope,
        bundle.date_range.start.format("%Y-%m-%d"),
        bundle.date_range.end.format("%Y-%m-%d")
    );

    if let Some(section) = &bundle.trends {
        println!("\n## Trends\n");
        match section {
            InsightSection::Ready { data } => {
                println!("| Metric | Slope | Average | Direction | Volatile |");
                println!("|--------|-------|---------|-----------|----------|");
                for trend in &data.trends {
                    println!(
                        "| {} | {:+.3} | {:.2} | {} | {} |",
                        trend.summary.metric,
                        trend.summary.slope,
                        trend.summary.average,
                        trend.direction,
                        if trend.high_volatility { "yes" } else { "no" }
                    );
                }
            }
            other => print_unready_markdown(other),
        }
    }

    if let Some(section) = &bundle.anomalies {
        println!("\n## Anomalies\n");
        match section {
            InsightSection::Ready { data } if data.anomalies.is_empty() => {
                println!("None detected across {} metrics.", data.metrics_scanned);
            }
            InsightSection::Ready { data } => {
                for anomaly in &data.anomalies {
                    println!(
                        "- **{}** on {}: {:.1} vs expected {:.1} ({} {})",
                        anomaly.metric,
                        anomaly.period.format("%Y-%m-%d"),
                        anomaly.value,
                        anomaly.expected,
                        anomaly.severity,
                        anomaly.direction
                    );
                }
            }
            other => print_unready_markdown(other),
        }
    }

    if let Some(section) = &bundle.collaboration {
        println!("\n## Collaboration\n");
        match section {
            InsightSection::Ready { data } => {
                println!(
                    "{} counterparts, {:.1} interactions each on average.\n",
                    data.distinct_counterparts, data.avg_interactions
                );
                for link in &data.counterparts {
                    println!(
                        "- {}: {} reviews given, {} received, {} comments",
                        link.actor.display_name,
                        link.reviews_given,
                        link.reviews_received,
                        link.comments
                    );
                }
            }
            other => print_unready_markdown(other),
        }
    }

    if let Some(section) = &bundle.health {
        println!("\n## Health\n");
        match section {
            InsightSection::Ready { data } => {
                println!(
                    "Overall **{}** — activity {}, staleness {}, responsiveness {}, merge rate {}.",
                    data.overall,
                    data.subscores.activity,
                    data.subscores.staleness,
                    data.subscores.responsiveness,
                    data.subscores.merge_rate
                );
            }
            other => print_unready_markdown(other),
        }
    }

    if !bundle.observations.is_empty() {
        println!("\n## Observations\n");
        for observation in &bundle.observations {
            match &observation.recommendation {
                Some(recommendation) => {
                    println!("- {} — *{}*", observation.insight, recommendation);
                }
                None => println!("- {}", observation.insight),
            }
        }
    }
}

fn print_unready_markdown<T>(section: &InsightSection<T>) {
    match section {
        InsightSection::Ready { .. } => {}
        InsightSection::InsufficientData { required, actual } => {
            println!("_Insufficient data: {actual} of {required} required points._");
        }
        InsightSection::Failed { error } => {
            println!("_Failed: {error}_");
        }
    }
}

const DEFAULT_CONFIG: &str = r#"# Cadence configuration.
# Every value shown is the default; delete anything you don't override.

[analysis]
# Minimum series length before anomaly detection runs.
min_anomaly_window = 7
# Z-score above which a period counts as anomalous.
z_threshold = 2.0
# Z-score above which an anomaly is high severity.
high_z_threshold = 3.0
# Absolute slope above which a trend counts as moving.
slope_threshold = 0.1
# A series is volatile when stddev exceeds this fraction of its mean.
volatility_ratio = 0.5

[scoring]
# Points per recent activity item, saturating at 100.
activity_weight = 2.0
# Points deducted per stale item, floored at 0.
staleness_penalty = 5.0

[scoring.weights]
# Must sum to 1.0.
activity = 0.3
staleness = 0.25
responsiveness = 0.2
merge_rate = 0.25
"#;

fn run_init(force: bool) -> Result<()> {
    let path = Path::new(".cadence.toml");
    if path.exists() && !force {
        bail!(".cadence.toml already exists (use --force to overwrite)");
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .into_diagnostic()
        .wrap_err("failed to write .cadence.toml")?;
    println!("wrote .cadence.toml");
    Ok(())
}
