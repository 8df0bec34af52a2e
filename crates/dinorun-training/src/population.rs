use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use dinorun_engine::{ACTION_COUNT, Action, Environment, Features};
use dinorun_network::{ForwardOutput, Genome, NetworkError, NetworkEvaluator, Objective};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    GenerationRecord, GeneticOperator, ParentSet, RunLimits, ScoreSummary, TrainingConfig,
    TrainingError,
};

/// Outcome of [`PopulationController::run_generation`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    /// The leader recorded for the finished generation.
    pub record: GenerationRecord,
    /// Final scores of every agent.
    pub summary: ScoreSummary,
    /// Ticks until extinction.
    pub ticks: u64,
}

/// Runs a population of environments against one batched network evaluator.
///
/// The controller samples the leading agent once at the end of every tick. A
/// leader is appended to the leader history whenever it differs from the
/// previously recorded one; the history starts as `[0]` and is kept across
/// generations. The last one or two history entries are the parents of the
/// next generation.
#[derive(Debug, Clone)]
pub struct PopulationController {
    environments: Vec<Environment>,
    evaluator: NetworkEvaluator,
    operator: GeneticOperator,
    objective: Objective,
    rng: Pcg32,
    leader_history: Vec<usize>,
    best_players: Vec<GenerationRecord>,
    generation: usize,
    last_decision: Option<ForwardOutput>,
}

impl PopulationController {
    /// Creates a population with parameters drawn uniformly from `[-1, 1]`.
    pub fn new(config: &TrainingConfig) -> Result<Self, TrainingError> {
        let mut controller = Self::without_parameters(config)?;
        controller.evaluator.randomize(&mut controller.rng);
        Ok(controller)
    }

    /// Creates a population whose every agent runs `genome`.
    pub fn with_genome(config: &TrainingConfig, genome: &Genome) -> Result<Self, TrainingError> {
        let mut controller = Self::without_parameters(config)?;
        let genomes = vec![genome.clone(); config.population];
        controller.set_genomes(&genomes)?;
        Ok(controller)
    }

    /// Creates a population without network parameters.
    ///
    /// [`tick`](Self::tick) fails with [`NetworkError::Uninitialized`] until
    /// [`set_genomes`](Self::set_genomes) is called.
    pub fn without_parameters(config: &TrainingConfig) -> Result<Self, TrainingError> {
        if config.population == 0 {
            return Err(TrainingError::EmptyPopulation);
        }
        let topology = config.topology()?;
        let mut rng = match config.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_rng(&mut rand::rng()),
        };
        let environments = (0..config.population)
            .map(|_| Environment::new(&config.game, rng.random()))
            .collect::<Result<Vec<_>, _>>()?;
        let evaluator = NetworkEvaluator::new(
            config.population,
            topology,
            config.hidden_activation,
            config.output_activation,
        )?;
        Ok(Self {
            environments,
            evaluator,
            operator: GeneticOperator::new(config.mutation),
            objective: config.objective,
            rng,
            leader_history: vec![0],
            best_players: vec![],
            generation: 0,
            last_decision: None,
        })
    }

    /// Replaces every agent's parameters.
    pub fn set_genomes(&mut self, genomes: &[Genome]) -> Result<(), TrainingError> {
        self.evaluator.set_all_genomes(genomes)?;
        Ok(())
    }

    #[must_use]
    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    #[must_use]
    pub fn evaluator(&self) -> &NetworkEvaluator {
        &self.evaluator
    }

    /// Number of completed generations.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn leader_history(&self) -> &[usize] {
        &self.leader_history
    }

    /// One record per completed generation, oldest first.
    #[must_use]
    pub fn best_players(&self) -> &[GenerationRecord] {
        &self.best_players
    }

    /// Most recent batched network decision.
    #[must_use]
    pub fn last_decision(&self) -> Option<&ForwardOutput> {
        self.last_decision.as_ref()
    }

    /// Actions chosen on the most recent tick, one per agent.
    #[must_use]
    pub fn last_actions(&self) -> Vec<Action> {
        self.last_decision
            .iter()
            .flat_map(|d| d.actions().iter().filter_map(|&i| Action::from_index(i)))
            .collect()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.environments.iter().filter(|e| e.is_alive()).count()
    }

    /// Advances every environment by one step and applies the networks' actions.
    ///
    /// Actions are computed for dead agents too but have no effect on them.
    pub fn tick(&mut self, dt: f64) -> Result<(), TrainingError> {
        // Fail before touching any environment.
        self.evaluator.parameters()?;

        for env in &mut self.environments {
            env.tick(dt);
        }
        let features = self
            .environments
            .iter()
            .map(Environment::features)
            .collect::<Vec<Features>>();
        let decision = self.evaluator.forward(&features, self.objective)?;

        for (env, &index) in self.environments.iter_mut().zip(decision.actions()) {
            if !env.is_alive() {
                continue;
            }
            let action = Action::from_index(index).ok_or(NetworkError::IndexOutOfRange {
                index,
                len: ACTION_COUNT,
            })?;
            env.apply_action(action);
        }
        self.last_decision = Some(decision);

        self.leading_agent();
        Ok(())
    }

    /// Index of the agent with the highest score, lowest index on ties.
    ///
    /// Appends the leader to the leader history when it changed.
    pub fn leading_agent(&mut self) -> usize {
        let scores = self
            .environments
            .iter()
            .map(Environment::score)
            .collect::<Vec<_>>();
        let leader = Objective::Maximize.select(&scores).unwrap_or(0);
        if self.leader_history.last() != Some(&leader) {
            tracing::trace!(
                generation = self.generation,
                leader,
                score = scores[leader],
                "leader changed"
            );
            self.leader_history.push(leader);
        }
        leader
    }

    /// Ticks until every agent is dead.
    ///
    /// Checks `cancel` and `limits` once per tick. Returns the number of ticks
    /// run.
    pub fn run_until_extinct(
        &mut self,
        dt: f64,
        limits: &RunLimits,
        cancel: &AtomicBool,
    ) -> Result<u64, TrainingError> {
        self.evaluator.parameters()?;

        let start = Instant::now();
        let mut ticks = 0;
        while self.alive_count() > 0 {
            if cancel.load(Ordering::Relaxed) {
                tracing::warn!(generation = self.generation, ticks, "run cancelled");
                return Err(TrainingError::Cancelled { ticks });
            }
            let over_ticks = limits.max_ticks.is_some_and(|max| ticks >= max);
            let over_time = limits
                .max_seconds
                .is_some_and(|max| start.elapsed().as_secs_f64() >= max);
            if over_ticks || over_time {
                tracing::warn!(
                    generation = self.generation,
                    ticks,
                    alive = self.alive_count(),
                    "run budget exhausted"
                );
                return Err(TrainingError::DidNotConverge { ticks });
            }
            self.tick(dt)?;
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Records the current leader and replaces every genome with offspring of
    /// the last one or two leaders.
    pub fn evolve(&mut self) -> Result<GenerationRecord, TrainingError> {
        let parameters = self.evaluator.parameters()?;
        let leader = self.leader_history.last().copied().unwrap_or(0);
        let record = GenerationRecord {
            generation: self.generation,
            agent: leader,
            fitness: self.environments[leader].score(),
            genome: parameters.genome(leader)?,
        };

        let recent = self
            .leader_history
            .iter()
            .rev()
            .take(2)
            .copied()
            .collect::<Vec<_>>();
        let parents = ParentSet::new(&recent)?;
        let offspring = self.operator.breed(parameters, parents, &mut self.rng)?;
        self.evaluator.set_parameters(offspring)?;

        tracing::debug!(
            generation = record.generation,
            leader,
            fitness = record.fitness,
            ?parents,
            "generation evolved"
        );
        self.best_players.push(record.clone());
        self.generation += 1;
        Ok(record)
    }

    /// Restarts every environment for the next generation.
    pub fn reset_all(&mut self) {
        for env in &mut self.environments {
            env.reset();
        }
        self.last_decision = None;
    }

    /// Runs one full generation: ticks until extinction, evolves and resets.
    pub fn run_generation(
        &mut self,
        dt: f64,
        limits: &RunLimits,
        cancel: &AtomicBool,
    ) -> Result<GenerationReport, TrainingError> {
        let ticks = self.run_until_extinct(dt, limits, cancel)?;
        let summary = ScoreSummary::new(self.environments.iter().map(Environment::score))
            .ok_or(TrainingError::EmptyPopulation)?;
        let record = self.evolve()?;
        self.reset_all();
        Ok(GenerationReport {
            record,
            summary,
            ticks,
        })
    }
}
