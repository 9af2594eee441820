use std::path::Path;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::checkpoint::checker::{read_json, write_json, Checker, DataKind};
use crate::checkpoint::record::{Checkpoint, ModelRecord};
use crate::data::convert::IntoMatrix;
use crate::error::{Result, RunnerError};
use crate::loss::loss_type::{Loss, LossType};
use crate::math::matrix::Matrix;
use crate::metrics::regression::{mean_absolute_error, pearsonr, r2_score};
use crate::metrics::summary::Summary;
use crate::network::init::Init;
use crate::network::model::{Model, ModelState};
use crate::optim::optimizer::OptimizerKind;
use crate::optim::scheduler::SchedulerKind;
use crate::runner::config::RunnerConfig;
use crate::runner::epoch_stats::EpochStats;

// ---------------------------------------------------------------------------
// Attach options
// ---------------------------------------------------------------------------

/// How an attached model is named, initialised and trained.
///
/// Defaults: name derived from the model description, `Init::Uniform { scale: 0.1 }`,
/// MSE loss, plain SGD, `lr = 0.001`, no scheduler.
pub struct AttachOptions {
    name: Option<String>,
    init: Option<Init>,
    loss: Box<dyn Loss>,
    optimizer: OptimizerKind,
    lr: f64,
    scheduler: Option<SchedulerKind>,
}

impl Default for AttachOptions {
    fn default() -> Self {
        AttachOptions {
            name: None,
            init: Some(Init::default()),
            loss: Box::new(LossType::Mse),
            optimizer: OptimizerKind::default(),
            lr: 0.001,
            scheduler: None,
        }
    }
}

impl AttachOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// `None` keeps the model's current weights.
    pub fn init(mut self, init: Option<Init>) -> Self {
        self.init = init;
        self
    }

    pub fn loss(mut self, loss: impl Loss + 'static) -> Self {
        self.loss = Box::new(loss);
        self
    }

    pub fn optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn lr(mut self, lr: f64) -> Self {
        self.lr = lr;
        self
    }

    pub fn scheduler(mut self, scheduler: SchedulerKind) -> Self {
        self.scheduler = Some(scheduler);
        self
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Flattened targets and predictions plus the metrics computed from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub y_true: Vec<f64>,
    pub y_pred: Vec<f64>,
    pub summary: Summary,
}

/// The file written by `ModelRunner::dump`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dump {
    pub name: String,
    /// The model's description.
    pub model: String,
    pub state: ModelState,
    /// Caller-supplied annotations, stored alongside the model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const DUMP_KEYS: [&str; 3] = ["name", "model", "state"];

/// Any record carrying a `state` field: checkpoints, model records and dumps.
#[derive(Deserialize)]
struct StateRecord {
    state: ModelState,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

struct Session {
    model: Box<dyn Model>,
    name: String,
    loss: Box<dyn Loss>,
    optimizer: OptimizerKind,
    lr: f64,
    scheduler: Option<SchedulerKind>,
    checker: Checker,
}

impl Session {
    fn record(&self) -> ModelRecord {
        ModelRecord {
            name: self.name.clone(),
            description: self.model.to_string(),
            state: self.model.state(),
        }
    }
}

/// Drives a model through fit / predict, persisting artifacts via a `Checker`.
///
/// ```no_run
/// use ferrite_runner::{ActivationFunction, AttachOptions, ModelRunner, Network, RunnerConfig};
///
/// # fn main() -> ferrite_runner::Result<()> {
/// let net = Network::new(vec![(8, 2, ActivationFunction::ReLU), (1, 8, ActivationFunction::Identity)])?;
/// let mut runner = ModelRunner::new(RunnerConfig::default().epochs(500));
/// runner.attach(net, AttachOptions::new().lr(0.01))?;
/// let x = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
/// let y = vec![1.0, -1.0];
/// runner.fit(x.clone(), y.clone())?;
/// let eval = runner.predict(x, y)?;
/// println!("r2 = {}", eval.summary.r2);
/// # Ok(())
/// # }
/// ```
pub struct ModelRunner {
    config: RunnerConfig,
    session: Option<Session>,
    history: Vec<EpochStats>,
}

impl ModelRunner {
    pub fn new(config: RunnerConfig) -> ModelRunner {
        let runner = ModelRunner {
            config,
            session: None,
            history: Vec::new(),
        };
        if runner.config.verbose {
            runner.log_environment();
        }
        runner
    }

    fn log_environment(&self) {
        log::info!("Runner environment:");
        log::info!("Running dir: {}", self.config.resolved_work_dir().display());
        log::info!("Epochs: {}", self.config.epochs);
        log::info!("Context: {}", self.config.device);
        log::info!("Check step: {}", self.config.check_step);
        log::info!("Log step: {}", self.config.log_step);
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.name.as_str())
    }

    pub fn model(&self) -> Option<&dyn Model> {
        self.session.as_ref().map(|s| &*s.model)
    }

    pub fn checker(&self) -> Option<&Checker> {
        self.session.as_ref().map(|s| &s.checker)
    }

    /// Per-epoch statistics of the last `fit`.
    pub fn history(&self) -> &[EpochStats] {
        &self.history
    }

    /// Attaches `model` for subsequent fit / predict calls, replacing any
    /// previously attached model.
    ///
    /// Initialises the weights (unless `options.init` is `None`), opens the
    /// model's artifact directory and records the initial model there.
    pub fn attach<M>(&mut self, model: M, options: AttachOptions) -> Result<&mut Self>
    where
        M: Model + 'static,
    {
        let mut model: Box<dyn Model> = Box::new(model);
        let name = options
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| describe_digest(&*model));

        if let Some(init) = options.init {
            let mut rng = match self.config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            model.init_weights(&init, &mut rng);
        }

        let checker = Checker::new(&name, self.config.resolved_work_dir())?;
        let session = Session {
            model,
            name,
            loss: options.loss,
            optimizer: options.optimizer,
            lr: options.lr,
            scheduler: options.scheduler,
            checker,
        };
        session.checker.save_init_model(&session.record())?;
        log::debug!("attached model `{}`", session.name);

        self.session = Some(session);
        self.history.clear();
        Ok(self)
    }

    /// Trains the attached model on `(x_train, y_train)` for `config.epochs`
    /// full-batch iterations.
    pub fn fit(&mut self, x_train: impl IntoMatrix, y_train: impl IntoMatrix) -> Result<&mut Self> {
        let config = &self.config;
        let session = self.session.as_mut().ok_or(RunnerError::NoModel)?;

        let x = x_train.into_matrix()?;
        let y = y_train.into_matrix()?;
        session.checker.save_data(DataKind::XTrain, &x)?;
        session.checker.save_data(DataKind::YTrain, &y)?;
        if x.rows != y.rows {
            return Err(RunnerError::shape("training samples", x.rows, y.rows));
        }
        if config.epochs == 0 {
            return Err(RunnerError::InvalidInput("epochs must be at least 1".into()));
        }

        let device = config.device.resolve();
        log::debug!("training on {device}");

        let mut optimizer = session.optimizer.build(session.lr);
        let mut scheduler = session.scheduler.map(|s| s.build());

        log::info!("=======start training=======");
        log::info!("Model name: {}", session.name);

        let epochs = config.epochs;
        let mut history = Vec::with_capacity(epochs);
        let mut loss = f64::NAN;

        for t in 0..epochs {
            let t_start = Instant::now();

            if let Some(s) = scheduler.as_mut().filter(|s| !s.is_plateau()) {
                s.step(&mut *optimizer, None);
            }

            let y_pred = session.model.forward(&x)?;
            loss = session.loss.loss(&y_pred, &y)?;

            if let Some(s) = scheduler.as_mut().filter(|s| s.is_plateau()) {
                s.step(&mut *optimizer, Some(loss));
            }

            session.model.zero_grad();
            let grad = session.loss.gradient(&y_pred, &y)?;
            session.model.backward(&grad)?;
            optimizer.step(&mut session.model.parameters_mut());

            if config.log_step > 0 && t % config.log_step == 0 {
                log::info!("at step[{t}/{epochs}], Loss={loss:.4}");
            }
            if config.check_step > 0 && t % config.check_step == 0 {
                session.checker.save_checkpoint(&Checkpoint {
                    epoch: t,
                    loss,
                    state: session.model.state(),
                })?;
            }

            history.push(EpochStats {
                epoch: t + 1,
                total_epochs: epochs,
                loss,
                learning_rate: optimizer.learning_rate(),
                elapsed_ms: t_start.elapsed().as_millis() as u64,
            });
        }

        log::info!("Final loss={loss:.4}");
        log::info!("=======over training=======");

        session.checker.save_checkpoint(&Checkpoint {
            epoch: epochs,
            loss,
            state: session.model.state(),
        })?;
        session.checker.save_trained_model(&session.record())?;

        self.history = history;
        Ok(self)
    }

    /// Forward pass only.
    pub fn infer(&mut self, x: impl IntoMatrix) -> Result<Matrix> {
        let session = self.session.as_mut().ok_or(RunnerError::NoModel)?;
        let x = x.into_matrix()?;
        let device = self.config.device.resolve();
        log::debug!("inferring on {device}");
        session.model.forward(&x)
    }

    /// Predicts `x_test`, scores the predictions against `y_test` and
    /// records the summary.
    pub fn predict(&mut self, x_test: impl IntoMatrix, y_test: impl IntoMatrix) -> Result<Evaluation> {
        let session = self.session.as_mut().ok_or(RunnerError::NoModel)?;

        let x = x_test.into_matrix()?;
        let y = y_test.into_matrix()?;
        session.checker.save_data(DataKind::XTest, &x)?;
        session.checker.save_data(DataKind::YTest, &y)?;

        let device = self.config.device.resolve();
        log::debug!("predicting on {device}");

        let y_true = y.ravel();
        let y_pred = session.model.forward(&x)?.ravel();
        if y_true.len() != y_pred.len() {
            return Err(RunnerError::shape("predictions", y_true.len(), y_pred.len()));
        }

        let mae = mean_absolute_error(&y_true, &y_pred)?;
        let r2 = r2_score(&y_true, &y_pred)?;
        let (r, p_value) = pearsonr(&y_true, &y_pred)?;
        let summary = Summary {
            layers: session.model.to_string(),
            name: session.checker.name().to_string(),
            mae,
            r2,
            pearsonr: r,
            p_value,
        };
        session.checker.save_summary(&summary)?;
        log::info!(
            "{}: mae={:.4} r2={:.4} pearsonr={:.4} p-value={:.4e}",
            summary.name,
            mae,
            r2,
            r,
            p_value
        );

        Ok(Evaluation {
            y_true,
            y_pred,
            summary,
        })
    }

    /// Loads parameters into the attached model from a checkpoint, a trained
    /// model record, or a dump.
    pub fn restore_checkpoint(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let session = self.session.as_mut().ok_or(RunnerError::NoModel)?;
        let record: StateRecord = read_json(path.as_ref())?;
        session.model.load_state(&record.state)?;
        log::info!("restored `{}` from {}", session.name, path.as_ref().display());
        Ok(self)
    }

    /// Loads the checkpoint saved at `epoch` for the attached model.
    pub fn restore_epoch(&mut self, epoch: usize) -> Result<&mut Self> {
        let path = self
            .checker()
            .ok_or(RunnerError::NoModel)?
            .checkpoint_path(epoch);
        self.restore_checkpoint(path)
    }

    /// Writes the attached model and `extra` annotations to `path` as JSON.
    ///
    /// `extra` may not use the keys the dump itself writes.
    pub fn dump(&self, path: impl AsRef<Path>, extra: Map<String, Value>) -> Result<()> {
        let session = self.session.as_ref().ok_or(RunnerError::NoModel)?;
        if let Some(key) = DUMP_KEYS.iter().find(|k| extra.contains_key(**k)) {
            return Err(RunnerError::InvalidInput(format!(
                "`{key}` is reserved in a dump and cannot be passed as an extra"
            )));
        }
        let dump = Dump {
            name: session.name.clone(),
            model: session.model.to_string(),
            state: session.model.state(),
            extra,
        };
        write_json(path.as_ref(), &dump)?;
        log::debug!("dumped `{}` to {}", session.name, path.as_ref().display());
        Ok(())
    }

    pub fn load_dump(path: impl AsRef<Path>) -> Result<Dump> {
        read_json(path.as_ref())
    }
}

/// Hex SHA-256 of the model description.
fn describe_digest(model: &dyn Model) -> String {
    Sha256::digest(model.to_string().as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::network::network::Network;

    fn quiet(dir: &Path) -> RunnerConfig {
        RunnerConfig::default().verbose(false).work_dir(dir).seed(1)
    }

    fn net() -> Network {
        Network::new(vec![(1, 2, ActivationFunction::Identity)]).unwrap()
    }

    #[test]
    fn calls_without_a_model_fail() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = ModelRunner::new(quiet(tmp.path()));
        let x = vec![vec![1.0, 2.0]];
        assert!(matches!(runner.fit(x.clone(), vec![1.0]), Err(RunnerError::NoModel)));
        assert!(matches!(runner.predict(x.clone(), vec![1.0]), Err(RunnerError::NoModel)));
        assert!(matches!(runner.infer(x), Err(RunnerError::NoModel)));
        assert!(matches!(runner.dump(tmp.path().join("d.json"), Map::new()), Err(RunnerError::NoModel)));
    }

    #[test]
    fn default_name_is_the_description_digest() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = ModelRunner::new(quiet(tmp.path()));
        runner.attach(net(), AttachOptions::new()).unwrap();
        let name = runner.name().unwrap().to_string();
        assert_eq!(name.len(), 64);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(tmp.path().join(&name).join("init_model.json").exists());

        // same architecture, same name
        let mut other = ModelRunner::new(quiet(tmp.path()));
        other.attach(net(), AttachOptions::new()).unwrap();
        assert_eq!(other.name().unwrap(), name);
    }

    #[test]
    fn mismatched_rows_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = ModelRunner::new(quiet(tmp.path()).epochs(3));
        runner.attach(net(), AttachOptions::new().name("m")).unwrap();
        let err = runner
            .fit(vec![vec![1.0, 2.0], vec![3.0, 4.0]], vec![1.0])
            .err()
            .unwrap();
        assert!(matches!(err, RunnerError::ShapeMismatch { .. }));
    }

    #[test]
    fn zero_epochs_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = ModelRunner::new(quiet(tmp.path()).epochs(0));
        runner.attach(net(), AttachOptions::new().name("m")).unwrap();
        assert!(matches!(
            runner.fit(vec![vec![1.0, 2.0]], vec![1.0]).err(),
            Some(RunnerError::InvalidInput(_))
        ));
    }

    #[test]
    fn dump_rejects_reserved_extras() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = ModelRunner::new(quiet(tmp.path()));
        runner.attach(net(), AttachOptions::new().name("m")).unwrap();
        for key in DUMP_KEYS {
            let path = tmp.path().join(format!("{key}.json"));
            let mut extra = Map::new();
            extra.insert(key.to_string(), Value::from("user-label"));
            assert!(matches!(runner.dump(&path, extra), Err(RunnerError::InvalidInput(_))));
            assert!(!path.exists());
        }
    }

    #[test]
    fn path_like_names_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let work_dir = tmp.path().join("runs");
        let mut runner = ModelRunner::new(quiet(&work_dir));
        let result = runner.attach(net(), AttachOptions::new().name("../outside"));
        assert!(matches!(result.err(), Some(RunnerError::InvalidInput(_))));
        assert!(!tmp.path().join("outside").exists());
        assert!(runner.name().is_none());
    }

    #[test]
    fn init_none_keeps_weights() {
        let tmp = tempfile::tempdir().unwrap();
        let mut n = net();
        n.layers[0].weights.value = Matrix::filled(2, 1, 3.0);
        let mut runner = ModelRunner::new(quiet(tmp.path()));
        runner.attach(n, AttachOptions::new().name("keep").init(None)).unwrap();
        let state = runner.model().unwrap().state();
        assert_eq!(state.get("0.weight"), Some(&Matrix::filled(2, 1, 3.0)));
    }
}
