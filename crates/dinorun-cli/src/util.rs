use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::{Serialize, de::DeserializeOwned};

use crate::model::best_players::BestPlayersFile;

/// JSON sink for saved files and per-tick traces.
pub struct Output {
    writer: Box<dyn Write>,
    target: String,
}

impl Output {
    /// Writes `value` as pretty JSON to `path`, or to stdout when absent.
    pub fn save_json<T>(value: &T, path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let mut output = match path {
            Some(path) => Output::create(&path)?,
            None => Output::stdout(),
        };
        output.write_json(value)
    }

    pub fn stdout() -> Self {
        Self {
            writer: Box::new(io::stdout().lock()),
            target: "stdout".to_owned(),
        }
    }

    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
            target: path.display().to_string(),
        })
    }

    /// Writes `value` as pretty-printed JSON.
    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        self.emit(|w| serde_json::to_writer_pretty(w, value))
    }

    /// Writes `value` as one line of JSON.
    pub fn write_json_line<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        self.emit(|w| serde_json::to_writer(w, value))
    }

    /// Runs `encode`, then terminates the line and flushes.
    fn emit<F>(&mut self, encode: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut Box<dyn Write>) -> serde_json::Result<()>,
    {
        let Self { writer, target } = self;
        encode(writer).with_context(|| format!("Failed to write JSON to {target}"))?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .with_context(|| format!("Failed to write to {target}"))
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {file_kind} file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {file_kind} file: {}", path.display()))
}

/// Reads a best players file and checks its genomes against its topology.
pub fn read_best_players_file<P>(path: P) -> anyhow::Result<BestPlayersFile>
where
    P: AsRef<Path>,
{
    let file: BestPlayersFile = read_json_file("best players", path)?;
    file.validate()?;
    Ok(file)
}
