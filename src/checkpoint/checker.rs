use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::checkpoint::record::{Checkpoint, ModelRecord};
use crate::error::{Result, RunnerError};
use crate::math::matrix::Matrix;
use crate::metrics::summary::Summary;

const INIT_MODEL: &str = "init_model.json";
const TRAINED_MODEL: &str = "trained_model.json";
const SUMMARY: &str = "summary.json";
const CHECKPOINT_DIR: &str = "checkpoints";

/// Which recorded dataset a matrix belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    XTrain,
    YTrain,
    XTest,
    YTest,
}

impl DataKind {
    fn file_name(self) -> &'static str {
        match self {
            DataKind::XTrain => "x_train.json",
            DataKind::YTrain => "y_train.json",
            DataKind::XTest => "x_test.json",
            DataKind::YTest => "y_test.json",
        }
    }
}

/// Writes the artifacts of one model's runs under `<work_dir>/<name>/`.
///
/// ```text
/// <work_dir>/<name>/
///   init_model.json
///   x_train.json  y_train.json  x_test.json  y_test.json
///   checkpoints/epoch_<t>.json
///   trained_model.json
///   summary.json
/// ```
#[derive(Debug, Clone)]
pub struct Checker {
    name: String,
    dir: PathBuf,
}

impl Checker {
    /// Creates (or reopens) the artifact directory for `name`.
    ///
    /// `name` must be a single path component.
    pub fn new(name: impl Into<String>, work_dir: impl AsRef<Path>) -> Result<Checker> {
        let name = name.into();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(RunnerError::InvalidInput(format!(
                "model name `{name}` must be a plain directory name"
            )));
        }
        let dir = work_dir.as_ref().join(&name);
        fs::create_dir_all(dir.join(CHECKPOINT_DIR))?;
        log::debug!("checker ready at {}", dir.display());
        Ok(Checker { name, dir })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_init_model(&self, record: &ModelRecord) -> Result<PathBuf> {
        self.write(self.dir.join(INIT_MODEL), record)
    }

    pub fn save_trained_model(&self, record: &ModelRecord) -> Result<PathBuf> {
        self.write(self.dir.join(TRAINED_MODEL), record)
    }

    pub fn load_trained_model(&self) -> Result<ModelRecord> {
        read_json(&self.dir.join(TRAINED_MODEL))
    }

    pub fn save_data(&self, kind: DataKind, data: &Matrix) -> Result<PathBuf> {
        self.write(self.dir.join(kind.file_name()), data)
    }

    pub fn load_data(&self, kind: DataKind) -> Result<Matrix> {
        read_json(&self.dir.join(kind.file_name()))
    }

    pub fn checkpoint_path(&self, epoch: usize) -> PathBuf {
        self.dir.join(CHECKPOINT_DIR).join(format!("epoch_{epoch}.json"))
    }

    pub fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<PathBuf> {
        self.write(self.checkpoint_path(checkpoint.epoch), checkpoint)
    }

    pub fn load_checkpoint(&self, epoch: usize) -> Result<Checkpoint> {
        read_json(&self.checkpoint_path(epoch))
    }

    /// Epochs that have a checkpoint on disk, ascending.
    pub fn checkpoints(&self) -> Result<Vec<usize>> {
        let mut epochs = Vec::new();
        for entry in fs::read_dir(self.dir.join(CHECKPOINT_DIR))? {
            let file_name = entry?.file_name();
            let epoch = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(".json"))
                .and_then(|stem| stem.strip_prefix("epoch_"))
                .and_then(|epoch| epoch.parse::<usize>().ok());
            epochs.extend(epoch);
        }
        epochs.sort_unstable();
        Ok(epochs)
    }

    pub fn save_summary(&self, summary: &Summary) -> Result<PathBuf> {
        self.write(self.dir.join(SUMMARY), summary)
    }

    pub fn load_summary(&self) -> Result<Summary> {
        read_json(&self.dir.join(SUMMARY))
    }

    fn write<T: Serialize>(&self, path: PathBuf, value: &T) -> Result<PathBuf> {
        write_json(&path, value)?;
        log::debug!("wrote {}", path.display());
        Ok(path)
    }
}

/// Serializes `value` to a pretty-printed JSON file.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Reads a JSON file, mapping a missing file to `CheckpointNotFound`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RunnerError::CheckpointNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
