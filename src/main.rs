use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use warpnn_distance::{
    BandConstraint, Dtw, ElasticDistance, Erp, Euclidean, Lcss, Measure, Msm, Transform, Twe, Wdtw,
};
use warpnn_io::{Dataset, ExperimentName, LabelMap, ResultWriter, UcrReader};
use warpnn_nn::{SequenceCache, SweepConfig, classify};

#[derive(Parser)]
#[command(name = "warpnn")]
#[command(about = "Nearest-neighbour time series classification under elastic distances")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for breaking ties between equally accurate windows
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Distance family and its parameters.
#[derive(Args, Debug, Clone)]
struct MeasureArgs {
    /// Distance family: euclidean, dtw, wdtw, erp, lcss, msm or twe
    #[arg(long, default_value = "dtw")]
    measure: String,

    /// ERP gap value
    #[arg(long, default_value_t = 0.0)]
    gap: f64,

    /// LCSS matching threshold
    #[arg(long, default_value_t = 0.1)]
    epsilon: f64,

    /// WDTW weight steepness
    #[arg(long, default_value_t = 0.05)]
    weight_g: f64,

    /// MSM split/merge cost
    #[arg(long, default_value_t = 0.5)]
    cost: f64,

    /// TWE stiffness
    #[arg(long, default_value_t = 0.001)]
    nu: f64,

    /// TWE deletion penalty
    #[arg(long, default_value_t = 1.0)]
    lambda: f64,
}

/// How data files are read and transformed before any distance is computed.
#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Cell delimiter of the data files: "comma" or "tab"
    #[arg(long, default_value = "comma")]
    delimiter: String,

    /// Z-normalize every series
    #[arg(long, default_value_t = false)]
    normalize: bool,

    /// Use the Keogh-Pazzani derivative of every series
    #[arg(long, default_value_t = false)]
    derivative: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Select a warping window by leave-one-out 1-NN on a training set
    Sweep {
        /// Training file (label first, one series per row)
        #[arg(long)]
        train: PathBuf,

        /// Optional test file, classified with the selected window
        #[arg(long)]
        test: Option<PathBuf>,

        /// Smallest window radius to try
        #[arg(long, default_value_t = 0)]
        min_window: usize,

        /// Largest window radius to try (defaults to the longest series length)
        #[arg(long)]
        max_window: Option<usize>,

        /// Distance between consecutive window radii
        #[arg(long, default_value_t = 1)]
        window_step: usize,

        /// Experiment name for JSON artifacts (written only when set)
        #[arg(long)]
        experiment: Option<String>,

        /// Output directory for JSON artifacts
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        measure: MeasureArgs,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Compute one distance between two rows of a data file
    Distance {
        /// Data file (label first, one series per row)
        #[arg(long)]
        data: PathBuf,

        /// Zero-based row of the first series
        #[arg(long)]
        first: usize,

        /// Zero-based row of the second series
        #[arg(long)]
        second: usize,

        /// Sakoe-Chiba window radius (unconstrained if not set)
        #[arg(long)]
        window: Option<usize>,

        /// Abandon once the distance reaches this value
        #[arg(long)]
        cutoff: Option<f64>,

        #[command(flatten)]
        measure: MeasureArgs,

        #[command(flatten)]
        input: InputArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct SweepOutput {
    measure: &'static str,
    n_train: usize,
    n_classes: usize,
    selected_window: Option<usize>,
    loocv_accuracy: Option<f64>,
    windows: Vec<WindowOutput>,
    avoided_fraction: f64,
    test: Option<TestOutput>,
}

#[derive(Serialize)]
struct WindowOutput {
    window: usize,
    accuracy: f64,
    confirmed: usize,
}

#[derive(Serialize)]
struct TestOutput {
    n_test: usize,
    correct: usize,
    accuracy: f64,
    error_rate: f64,
}

#[derive(Serialize)]
struct DistanceOutput {
    measure: &'static str,
    first: usize,
    second: usize,
    window: Option<usize>,
    distance: Option<f64>,
    validity_radius: Option<usize>,
    lower_bound: f64,
}

fn build_constraint(window: Option<usize>) -> BandConstraint {
    window.map_or(BandConstraint::Unconstrained, BandConstraint::SakoeChibaRadius)
}

fn parse_measure(args: &MeasureArgs) -> Result<Measure> {
    let measure: Measure = match args.measure.as_str() {
        "euclidean" => Euclidean::new().into(),
        "dtw" => Dtw::unconstrained().into(),
        "wdtw" => Wdtw::new(args.weight_g)?.into(),
        "erp" => Erp::new(args.gap)?.into(),
        "lcss" => Lcss::new(args.epsilon)?.into(),
        "msm" => Msm::new(args.cost)?.into(),
        "twe" => Twe::new(args.nu, args.lambda)?.into(),
        other => anyhow::bail!(
            "unknown measure: {other} (expected euclidean, dtw, wdtw, erp, lcss, msm, or twe)"
        ),
    };
    Ok(measure)
}

fn parse_delimiter(s: &str) -> Result<u8> {
    match s {
        "comma" => Ok(b','),
        "tab" => Ok(b'\t'),
        other => anyhow::bail!("unknown delimiter: {other} (expected comma or tab)"),
    }
}

fn load(path: &Path, input: &InputArgs, labels: &mut LabelMap) -> Result<Dataset> {
    let mut dataset = UcrReader::new(path)
        .with_delimiter(parse_delimiter(&input.delimiter)?)
        .read(labels)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let transforms = [
        (input.normalize, Transform::ZNormalize),
        (input.derivative, Transform::Derivative),
    ];
    for (_, transform) in transforms.into_iter().filter(|(on, _)| *on) {
        for (row, sequence) in dataset.sequences.iter_mut().enumerate() {
            sequence
                .transform_in_place(|s| transform.apply(s))
                .with_context(|| format!("{transform:?} failed on row {row} of {}", path.display()))?;
        }
        info!(?transform, n = dataset.len(), "series transformed");
    }
    Ok(dataset)
}

#[allow(clippy::too_many_arguments)]
fn run_sweep(
    seed: u64,
    train_path: PathBuf,
    test_path: Option<PathBuf>,
    min_window: usize,
    max_window: Option<usize>,
    window_step: usize,
    experiment: Option<String>,
    output_dir: PathBuf,
    measure_args: &MeasureArgs,
    input: &InputArgs,
) -> Result<SweepOutput> {
    let measure = parse_measure(measure_args)?;
    let writer = experiment
        .map(|name| -> Result<ResultWriter> {
            Ok(ResultWriter::new(&output_dir, ExperimentName::new(name)?)?)
        })
        .transpose()?;

    let mut labels = LabelMap::new();
    let train = load(&train_path, input, &mut labels)?;

    let (min_window, max_window) = if measure.is_windowed() {
        (min_window, max_window.unwrap_or_else(|| train.max_len()))
    } else {
        info!(measure = measure.name(), "measure has no window; sweeping radius 0 only");
        (0, 0)
    };

    let config = SweepConfig::new(min_window, max_window)?
        .with_window_step(window_step)?
        .with_seed(seed);
    let mut train_cache = SequenceCache::new(&train.sequences, BandConstraint::Unconstrained);
    let result = config
        .run(measure, &train.sequences, &mut train_cache)
        .context("window sweep failed")?;
    let selected = config.select_window(&result);
    info!(?selected, accuracy = ?result.best_accuracy(), "window selected");

    if let Some(writer) = &writer {
        writer.write_sweep(measure.name(), &result, selected)?;
    }

    let test = match (test_path, selected) {
        (Some(path), Some(window)) => {
            let test = load(&path, input, &mut labels)?;
            let test_cache = SequenceCache::new(&test.sequences, BandConstraint::Unconstrained);
            let windowed = measure.with_window(window);
            let outcome = classify(
                &train.sequences,
                &mut train_cache,
                &test.sequences,
                &test_cache,
                windowed,
            )
            .context("test-set classification failed")?;
            if let Some(writer) = &writer {
                writer.write_classification(measure.name(), &labels, &outcome)?;
            }
            Some(TestOutput {
                n_test: test.len(),
                correct: outcome.correct,
                accuracy: outcome.accuracy,
                error_rate: 1.0 - outcome.accuracy,
            })
        }
        _ => None,
    };

    Ok(SweepOutput {
        measure: measure.name(),
        n_train: train.len(),
        n_classes: labels.len(),
        selected_window: selected,
        loocv_accuracy: result.best_accuracy(),
        windows: result
            .scores
            .iter()
            .map(|s| WindowOutput {
                window: s.window,
                accuracy: s.accuracy,
                confirmed: s.confirmed,
            })
            .collect(),
        avoided_fraction: result.total_stats().avoided_fraction(),
        test,
    })
}

fn run_distance(
    data: PathBuf,
    first: usize,
    second: usize,
    window: Option<usize>,
    cutoff: Option<f64>,
    measure_args: &MeasureArgs,
    input: &InputArgs,
) -> Result<DistanceOutput> {
    let measure = parse_measure(measure_args)?.with_constraint(build_constraint(window));
    let dataset = load(&data, input, &mut LabelMap::new())?;

    let mut cache = SequenceCache::new(&dataset.sequences, BandConstraint::Unconstrained);
    let envelope = measure.envelope_constraint();
    if let Some(constraint) = envelope {
        cache.get_envelope(second, constraint)?;
    }
    let query = cache.bound_input(first, None)?;
    let reference = cache.bound_input(second, envelope)?;

    let cutoff = cutoff.unwrap_or(f64::INFINITY);
    let extended = measure
        .distance_extended(query.series(), reference.series(), cutoff)
        .context("distance computation failed")?;

    Ok(DistanceOutput {
        measure: measure.name(),
        first,
        second,
        window,
        distance: extended.distance.is_finite().then(|| extended.distance.value()),
        validity_radius: extended.validity_radius,
        lower_bound: measure.lower_bound(&query, &reference, cutoff),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Sweep {
            train,
            test,
            min_window,
            max_window,
            window_step,
            experiment,
            output_dir,
            measure,
            input,
        } => {
            let output = run_sweep(
                cli.seed,
                train,
                test,
                min_window,
                max_window,
                window_step,
                experiment,
                output_dir,
                &measure,
                &input,
            )?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Distance {
            data,
            first,
            second,
            window,
            cutoff,
            measure,
            input,
        } => {
            let output = run_distance(data, first, second, window, cutoff, &measure, &input)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
