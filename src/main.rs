//! Demo driver: fits a small regression network on synthetic data, evaluates
//! it on a held-out split and dumps the trained model.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map};

use ferrite_runner::{
    ActivationFunction, AttachOptions, Device, Init, Network, ModelRunner, OptimizerKind,
    Result, RunnerConfig, SchedulerKind,
};

#[derive(Parser, Debug)]
#[command(name = "ferrite-runner", about = "Fit and evaluate a regression network")]
struct Args {
    /// Runner config JSON; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    epochs: Option<usize>,

    /// `cpu` or `gpu` (falls back to cpu).
    #[arg(long)]
    device: Option<Device>,

    #[arg(long)]
    work_dir: Option<PathBuf>,

    #[arg(long)]
    log_step: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 0.01)]
    lr: f64,

    /// Number of synthetic samples.
    #[arg(long, default_value_t = 200)]
    samples: usize,

    /// Where to write the final model dump.
    #[arg(long, default_value = "model.json")]
    dump: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => RunnerConfig::load_json(path)?,
        None => RunnerConfig::default().epochs(1000).log_step(100),
    };
    if let Some(epochs) = args.epochs {
        config = config.epochs(epochs);
    }
    if let Some(device) = args.device {
        config = config.device(device);
    }
    if let Some(dir) = args.work_dir {
        config = config.work_dir(dir);
    }
    if let Some(step) = args.log_step {
        config = config.log_step(step);
    }
    if let Some(seed) = args.seed {
        config = config.seed(seed);
    }

    let (x, y) = synthetic(args.samples.max(4), config.seed.unwrap_or(0));
    let split = held_out_split(x.len());

    let network = Network::new(vec![
        (16, 2, ActivationFunction::Tanh),
        (1, 16, ActivationFunction::Identity),
    ])?;
    log::info!(
        "{} train / {} test samples, {} -> {} network",
        split,
        x.len() - split,
        network.input_size(),
        network.output_size()
    );

    let mut runner = ModelRunner::new(config);
    runner.attach(
        network,
        AttachOptions::new()
            .init(Some(Init::Xavier))
            .optimizer(OptimizerKind::adam())
            .lr(args.lr)
            .scheduler(SchedulerKind::plateau()),
    )?;
    runner.fit(&x[..split], &y[..split])?;

    let eval = runner.predict(&x[split..], &y[split..])?;
    println!("{}", serde_json::to_string_pretty(&eval.summary)?);

    let mut extra = Map::new();
    extra.insert("samples".into(), json!(args.samples));
    extra.insert("summary".into(), serde_json::to_value(&eval.summary)?);
    runner.dump(&args.dump, extra)?;
    log::info!("model written to {}", args.dump.display());
    Ok(())
}

/// First test index: roughly an 80/20 split, keeping at least two samples
/// on each side so the correlation is defined.
fn held_out_split(n: usize) -> usize {
    n - (n / 5).max(2)
}

/// `y = sin(πx₁) + x₂²` sampled on `[-1, 1]²`.
fn synthetic(n: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x1: f64 = rng.gen_range(-1.0..1.0);
            let x2: f64 = rng.gen_range(-1.0..1.0);
            (vec![x1, x2], (std::f64::consts::PI * x1).sin() + x2 * x2)
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_two_test_samples() {
        for n in 4..=12 {
            let split = held_out_split(n);
            assert!(split >= 2 && n - split >= 2, "n = {n}");
        }
        assert_eq!(held_out_split(200), 160);
    }
}
