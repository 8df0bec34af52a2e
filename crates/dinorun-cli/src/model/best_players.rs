use anyhow::Context as _;
use chrono::{DateTime, Utc};
use dinorun_engine::GameConfig;
use dinorun_network::{Activation, Objective, Topology};
use dinorun_training::{GenerationRecord, RunLimits, TrainingConfig};
use serde::{Deserialize, Serialize};

/// Leaders of every generation of one training run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BestPlayersFile {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub topology: Topology,
    pub hidden_activation: Activation,
    pub output_activation: Activation,
    #[serde(default)]
    pub objective: Objective,
    /// Time step the records were trained with.
    #[serde(default = "default_dt")]
    pub dt: f64,
    pub game: GameConfig,
    pub records: Vec<GenerationRecord>,
}

fn default_dt() -> f64 {
    TrainingConfig::default().dt
}

impl BestPlayersFile {
    /// Collects the settings of `config` that replaying `records` depends on.
    pub fn new(
        name: String,
        trained_at: DateTime<Utc>,
        config: &TrainingConfig,
        records: Vec<GenerationRecord>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            name,
            trained_at,
            topology: config.topology()?,
            hidden_activation: config.hidden_activation,
            output_activation: config.output_activation,
            objective: config.objective,
            dt: config.dt,
            game: config.game.clone(),
            records,
        })
    }

    /// Checks every stored genome against the stored topology.
    pub fn validate(&self) -> anyhow::Result<()> {
        for record in &self.records {
            record.genome.check_shape(&self.topology).with_context(|| {
                format!(
                    "Record of generation #{} does not match the topology",
                    record.generation
                )
            })?;
        }
        Ok(())
    }

    /// The record at `index`, or the best one.
    pub fn record(&self, index: Option<usize>) -> anyhow::Result<&GenerationRecord> {
        match index {
            Some(i) => self.records.get(i).with_context(|| {
                format!(
                    "Record index {i} out of range ({} records)",
                    self.records.len()
                )
            }),
            None => self.best_record(),
        }
    }

    /// The record with the highest fitness, earliest generation on ties.
    pub fn best_record(&self) -> anyhow::Result<&GenerationRecord> {
        let fitness = self.records.iter().map(|r| r.fitness).collect::<Vec<_>>();
        let best = Objective::Maximize
            .select(&fitness)
            .context("Best players file has no records")?;
        Ok(&self.records[best])
    }

    /// Configuration for running stored genomes in a population of `population`.
    pub fn training_config(&self, population: usize, seed: Option<u64>) -> TrainingConfig {
        TrainingConfig {
            population,
            layers: self.topology.layers().to_vec(),
            hidden_activation: self.hidden_activation,
            output_activation: self.output_activation,
            objective: self.objective,
            dt: self.dt,
            limits: RunLimits::unbounded(),
            seed,
            game: self.game.clone(),
            ..TrainingConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use dinorun_network::{Genome, LayerSpec, Matrix};
    use dinorun_training::PopulationController;

    use super::*;

    fn file() -> BestPlayersFile {
        let topology = Topology::new(1, vec![LayerSpec::new(1, 1)]).unwrap();
        let record = |generation, fitness| GenerationRecord {
            generation,
            agent: 0,
            fitness,
            genome: Genome {
                weights: vec![Matrix::from_vec(1, 1, vec![0.5]).unwrap()],
                biases: vec![Matrix::from_vec(1, 1, vec![0.0]).unwrap()],
            },
        };
        BestPlayersFile {
            name: "test".to_owned(),
            trained_at: Utc::now(),
            topology,
            hidden_activation: Activation::Relu,
            output_activation: Activation::Identity,
            objective: Objective::Maximize,
            dt: 0.01,
            game: GameConfig::default(),
            records: vec![record(0, 10.0), record(1, 30.0), record(2, 20.0), record(3, 30.0)],
        }
    }

    #[test]
    fn test_record_selection() {
        let file = file();
        assert_eq!(file.record(None).unwrap().generation, 1);
        assert_eq!(file.record(Some(0)).unwrap().fitness, 10.0);
        assert!(file.record(Some(4)).is_err());
    }

    #[test]
    fn test_best_record_survives_regression() {
        let mut file = file();
        assert_eq!(file.best_record().unwrap().generation, 1);
        file.records.truncate(3);
        assert_eq!(file.best_record().unwrap().generation, 1);
        file.records.clear();
        assert!(file.best_record().is_err());
    }

    #[test]
    fn test_replay_config_matches_training() {
        let config = TrainingConfig {
            population: 4,
            objective: Objective::Minimize,
            dt: 0.1,
            seed: Some(3),
            limits: RunLimits {
                max_ticks: Some(100_000),
                max_seconds: None,
            },
            ..TrainingConfig::default()
        };
        let mut controller = PopulationController::new(&config).unwrap();
        controller
            .run_generation(config.dt, &config.limits, &AtomicBool::new(false))
            .unwrap();
        let file = BestPlayersFile::new(
            "test".to_owned(),
            Utc::now(),
            &config,
            controller.best_players().to_vec(),
        )
        .unwrap();

        let json = serde_json::to_string(&file).unwrap();
        let back: BestPlayersFile = serde_json::from_str(&json).unwrap();
        back.validate().unwrap();
        let replay = back.training_config(1, None);
        assert_eq!(replay.objective, Objective::Minimize);
        assert_eq!(replay.dt, 0.1);
        assert_eq!(replay.layers, config.layers);
        assert_eq!(replay.game, config.game);
    }

    #[test]
    fn test_missing_replay_settings_use_defaults() {
        let mut value = serde_json::to_value(file()).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("objective");
        object.remove("dt");
        let back: BestPlayersFile = serde_json::from_value(value).unwrap();
        assert_eq!(back.objective, Objective::Maximize);
        assert_eq!(back.dt, 0.01);
    }

    #[test]
    fn test_validate_detects_shape_mismatch() {
        let mut file = file();
        assert!(file.validate().is_ok());
        file.records[1].genome.biases.clear();
        assert!(file.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let file = file();
        let json = serde_json::to_string(&file).unwrap();
        let back: BestPlayersFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.records, file.records);
        assert_eq!(back.topology, file.topology);
        assert_eq!(back.trained_at, file.trained_at);
    }
}
