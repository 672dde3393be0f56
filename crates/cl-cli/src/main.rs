//! countllr CLI

mod input;

use anyhow::{Context, Result, bail};
use cl_inference::analysis::hypothesis_seed;
use cl_inference::{AnalysisConfig, DEFAULT_N_EDGES, GeneratorConfig, HypothesisOutcome, generate_llr};
use cl_viz_render::config::resolve_config_with_theme;
use cl_viz_render::theme::BuiltinTheme;
use clap::{Args, Parser, Subcommand, ValueEnum};
use input::Analysis;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "countllr")]
#[command(about = "countllr - LLR hypothesis tests for binned counting experiments")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads an analysis file.
#[derive(Args)]
struct IoArgs {
    /// Input analysis (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file for results (pretty JSON). Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Threads (0 = auto). Results do not depend on the thread count.
    #[arg(long, default_value = "0")]
    threads: usize,
}

/// Pseudo-experiment settings.
#[derive(Args)]
struct GenArgs {
    /// Pseudo-experiments per hypothesis
    #[arg(long, default_value = "10000")]
    n_experiments: usize,

    /// Base RNG seed; hypothesis `i` uses `seed + (i << 32)`
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Log the fraction of empty bins met while generating
    #[arg(long)]
    report_empty: bool,
}

impl GenArgs {
    fn generator(&self) -> GeneratorConfig {
        GeneratorConfig {
            report_empty: self.report_empty,
            ..GeneratorConfig::default().with_experiments(self.n_experiments).with_seed(self.seed)
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Full batch: LLR samples, PDFs, quantile bands and confidence levels
    Run {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        generator: GenArgs,

        /// Number of edges of the common LLR binning
        #[arg(long, default_value_t = DEFAULT_N_EDGES)]
        n_edges: usize,

        /// Keep the raw LLR samples in the output
        #[arg(long)]
        include_samples: bool,
    },

    /// Background-like and signal-plus-background-like LLR samples of one hypothesis
    Generate {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        generator: GenArgs,

        /// Hypothesis index (0-based, input order)
        #[arg(long)]
        hypothesis: usize,
    },

    /// Observed LLR of every hypothesis
    Observed {
        #[command(flatten)]
        io: IoArgs,
    },

    /// Plot-friendly artifacts (JSON)
    Viz {
        #[command(subcommand)]
        command: VizCommands,
    },

    /// Render an artifact JSON to SVG
    Render {
        /// Artifact JSON produced by `countllr viz`
        #[arg(long)]
        artifact: PathBuf,

        /// Artifact kind (llr, yields, heatmap)
        #[arg(long)]
        kind: String,

        /// YAML plot configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Built-in theme used when the config does not name one
        #[arg(long)]
        theme: Option<String>,

        /// Output SVG file. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print version
    Version,
}

#[derive(Subcommand)]
enum VizCommands {
    /// LLR distributions with observed value, bands and confidence levels
    Llr {
        #[command(flatten)]
        io: IoArgs,

        #[command(flatten)]
        generator: GenArgs,

        /// Number of edges of the common LLR binning
        #[arg(long, default_value_t = DEFAULT_N_EDGES)]
        n_edges: usize,
    },

    /// Stacked background and signal yields with data (1D inputs)
    Yields {
        #[command(flatten)]
        io: IoArgs,
    },

    /// Heat map of one 2D histogram
    Heatmap {
        #[command(flatten)]
        io: IoArgs,

        /// Hypothesis index (0-based, input order)
        #[arg(long, default_value = "0")]
        hypothesis: usize,

        /// Which histogram of the hypothesis to map
        #[arg(long, value_enum, default_value = "background")]
        histogram: HistogramRole,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum HistogramRole {
    Background,
    Signal,
    Data,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Stdout carries the JSON/SVG results; log records go to stderr.
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { io, generator, n_edges, include_samples } => {
            cmd_run(&io, &generator, n_edges, include_samples)
        }
        Commands::Generate { io, generator, hypothesis } => cmd_generate(&io, &generator, hypothesis),
        Commands::Observed { io } => cmd_observed(&io),
        Commands::Viz { command } => match command {
            VizCommands::Llr { io, generator, n_edges } => cmd_viz_llr(&io, &generator, n_edges),
            VizCommands::Yields { io } => cmd_viz_yields(&io),
            VizCommands::Heatmap { io, hypothesis, histogram } => cmd_viz_heatmap(&io, hypothesis, histogram),
        },
        Commands::Render { artifact, kind, config, theme, output } => {
            cmd_render(&artifact, &kind, config.as_ref(), theme.as_deref(), output.as_ref())
        }
        Commands::Version => {
            println!("countllr {}", cl_core::VERSION);
            Ok(())
        }
    }
}

fn load_analysis(io: &IoArgs) -> Result<Analysis> {
    if io.threads > 0 {
        // Best-effort; if a global pool already exists, keep going.
        let _ = rayon::ThreadPoolBuilder::new().num_threads(io.threads).build_global();
    }
    Analysis::load(&io.input)
}

fn run_batch(analysis: &Analysis, generator: &GenArgs, n_edges: usize) -> Vec<HypothesisOutcome> {
    let config = AnalysisConfig { generator: generator.generator(), n_edges };
    let outcomes = analysis.run(&config);
    let failed = outcomes.iter().filter(|o| o.result().is_none()).count();
    tracing::info!(hypotheses = outcomes.len(), failed, "batch finished");
    outcomes
}

fn cmd_run(io: &IoArgs, generator: &GenArgs, n_edges: usize, include_samples: bool) -> Result<()> {
    let analysis = load_analysis(io)?;
    let mut outcomes = run_batch(&analysis, generator, n_edges);
    if !include_samples {
        outcomes = outcomes.into_iter().map(|o| o.map_result(|r| r.without_samples())).collect();
    }

    let output_json = serde_json::json!({
        "tool": "countllr",
        "version": cl_core::VERSION,
        "mode": analysis.mode(),
        "n_experiments": generator.n_experiments,
        "seed": generator.seed,
        "n_edges": n_edges,
        "hypotheses": outcomes,
    });
    write_json(io.output.as_ref(), output_json)
}

fn cmd_generate(io: &IoArgs, generator: &GenArgs, hypothesis: usize) -> Result<()> {
    let analysis = load_analysis(io)?;
    let h = analysis.hypothesis(hypothesis)?;
    let config = GeneratorConfig {
        seed: Some(hypothesis_seed(generator.seed, hypothesis)),
        ..generator.generator()
    };
    let samples = generate_llr(h.background, h.signal, &config)
        .with_context(|| format!("generating LLR samples for '{}'", h.label))?;

    let output_json = serde_json::json!({
        "label": h.label,
        "mass_gev": h.mass_gev,
        "hypothesis": hypothesis,
        "n_experiments": samples.len(),
        "seed": samples.seed,
        "diagnostics": samples.diagnostics,
        "b_like": samples.b_like,
        "sb_like": samples.sb_like,
    });
    write_json(io.output.as_ref(), output_json)
}

fn cmd_observed(io: &IoArgs) -> Result<()> {
    let analysis = load_analysis(io)?;
    let results = analysis.observed()?;

    let hypotheses: Vec<serde_json::Value> = analysis
        .hypotheses()
        .iter()
        .zip(results)
        .map(|(h, r)| match r {
            Ok(obs) => serde_json::json!({
                "label": h.label,
                "mass_gev": h.mass_gev,
                "status": "completed",
                "observed": obs.value,
                "n_empty_bins": obs.n_empty_bins,
                "ignored_counts": obs.ignored_counts,
            }),
            Err(e) => {
                tracing::error!(hypothesis = h.label, "{e}");
                serde_json::json!({
                    "label": h.label,
                    "mass_gev": h.mass_gev,
                    "status": "failed",
                    "error": e.to_string(),
                })
            }
        })
        .collect();

    let output_json = serde_json::json!({ "mode": analysis.mode(), "hypotheses": hypotheses });
    write_json(io.output.as_ref(), output_json)
}

fn cmd_viz_llr(io: &IoArgs, generator: &GenArgs, n_edges: usize) -> Result<()> {
    let analysis = load_analysis(io)?;
    let outcomes = run_batch(&analysis, generator, n_edges);
    let artifact = cl_viz::llr_distribution_artifact(&outcomes)?;
    write_json(io.output.as_ref(), serde_json::to_value(artifact)?)
}

fn cmd_viz_yields(io: &IoArgs) -> Result<()> {
    let analysis = load_analysis(io)?;
    let artifact = cl_viz::yields_artifact(&analysis.hypotheses())?;
    write_json(io.output.as_ref(), serde_json::to_value(artifact)?)
}

fn cmd_viz_heatmap(io: &IoArgs, hypothesis: usize, role: HistogramRole) -> Result<()> {
    let analysis = load_analysis(io)?;
    let h = analysis.hypothesis(hypothesis)?;
    let (name, hist) = match role {
        HistogramRole::Background => ("background", h.background),
        HistogramRole::Signal => ("signal", h.signal),
        HistogramRole::Data => ("data", h.data),
    };
    let Some(hist2d) = hist.as_two_d() else {
        bail!("heatmap needs a 2D histogram; {name} of '{}' is 1D", h.label);
    };
    let title = match role {
        HistogramRole::Signal => format!("signal ({})", h.label),
        _ => name.to_string(),
    };
    let artifact = cl_viz::heatmap_artifact(&title, hist2d)?;
    write_json(io.output.as_ref(), serde_json::to_value(artifact)?)
}

fn cmd_render(
    artifact: &PathBuf,
    kind: &str,
    config: Option<&PathBuf>,
    theme: Option<&str>,
    output: Option<&PathBuf>,
) -> Result<()> {
    let fallback = match theme {
        Some(name) => BuiltinTheme::parse(name).map_err(anyhow::Error::msg)?,
        None => BuiltinTheme::default(),
    };
    let yaml = config.map(std::fs::read_to_string).transpose()?;
    let viz_config = resolve_config_with_theme(yaml.as_deref(), fallback)?;

    tracing::info!(path = %artifact.display(), kind, "rendering artifact");
    let json = std::fs::read_to_string(artifact)?;
    if let Some(path) = output {
        cl_viz_render::render_to_file(&json, kind, path, &viz_config)?;
        tracing::info!(path = %path.display(), "wrote SVG");
    } else {
        println!("{}", cl_viz_render::render_svg(&json, kind, &viz_config)?);
    }
    Ok(())
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
