//! Crossover, mutation and folding of batched network parameters.
//!
//! Breeding works on whole [`NetworkParameters`] tensors rather than on
//! individual genomes:
//!
//! 1. **Crossover** - every scalar of every offspring is copied from one of the
//!    parents, chosen independently per element and per offspring.
//! 2. **Mutation** - a [`MutationShape`] is applied to uniform noise in
//!    `[-1, 1]` and added to the copied value.
//! 3. **Fold** - the mutated value is passed through [`zigzag`].
//!
//! The random choices are drawn up front into a [`CrossoverPlan`] and a
//! [`MutationNoise`], so [`GeneticOperator::breed_with`] is a pure function
//! that can be tested without a random number generator.

use dinorun_network::{LayerParameters, LayerShape, NetworkError, NetworkParameters};
use rand::Rng;

use crate::{MutationShape, TrainingError, zigzag};

/// One or two distinct agents whose parameters seed the next generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentSet {
    Single(usize),
    Pair(usize, usize),
}

impl ParentSet {
    /// Accepts exactly one index or two distinct indices.
    pub fn new(indices: &[usize]) -> Result<Self, TrainingError> {
        match *indices {
            [a] => Ok(Self::Single(a)),
            [a, b] if a != b => Ok(Self::Pair(a, b)),
            _ => Err(TrainingError::InvalidParents {
                parents: indices.to_vec(),
            }),
        }
    }

    /// Number of parents (1 or 2).
    #[must_use]
    pub fn count(self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Pair(..) => 2,
        }
    }

    /// Agent index stored in crossover slot `slot`.
    #[must_use]
    pub fn parent(self, slot: u8) -> usize {
        match (self, slot) {
            (Self::Single(a) | Self::Pair(a, _), 0) | (Self::Single(a), _) => a,
            (Self::Pair(_, b), _) => b,
        }
    }

    pub fn indices(self) -> impl Iterator<Item = usize> {
        let (a, b) = match self {
            Self::Single(a) => (a, None),
            Self::Pair(a, b) => (a, Some(b)),
        };
        std::iter::once(a).chain(b)
    }

    fn check_range(self, agents: usize) -> Result<(), TrainingError> {
        match self.indices().find(|&i| i >= agents) {
            Some(index) => Err(TrainingError::ParentOutOfRange { index, len: agents }),
            None => Ok(()),
        }
    }
}

/// Per-element draws for one layer, laid out like [`LayerParameters`].
#[derive(Debug, Clone, PartialEq)]
struct LayerDraws<T> {
    weights: Vec<T>,
    biases: Vec<T>,
}

impl<T> LayerDraws<T> {
    fn from_fn<F>(agents: usize, shape: LayerShape, mut f: F) -> Self
    where
        F: FnMut() -> T,
    {
        Self {
            weights: (0..agents * shape.weight_len()).map(|_| f()).collect(),
            biases: (0..agents * shape.bias_len()).map(|_| f()).collect(),
        }
    }
}

fn check_draws<T>(
    what: &'static str,
    agents: usize,
    layers: &[LayerDraws<T>],
    parameters: &NetworkParameters,
) -> Result<(), NetworkError> {
    let expected = parameters
        .layers()
        .iter()
        .map(|l| l.weights().len() + l.biases().len())
        .collect::<Vec<_>>();
    let actual = layers
        .iter()
        .map(|l| l.weights.len() + l.biases.len())
        .collect::<Vec<_>>();
    if agents != parameters.agents() || expected != actual {
        return Err(NetworkError::ShapeMismatch {
            what,
            expected: expected.iter().sum(),
            actual: actual.iter().sum(),
        });
    }
    Ok(())
}

/// Which parent slot every offspring element is copied from.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossoverPlan {
    agents: usize,
    layers: Vec<LayerDraws<u8>>,
}

impl CrossoverPlan {
    /// Draws a slot uniformly from `parents` for every element of every offspring.
    pub fn random<R>(rng: &mut R, agents: usize, shapes: &[LayerShape], parents: ParentSet) -> Self
    where
        R: Rng + ?Sized,
    {
        let layers = shapes
            .iter()
            .map(|&shape| {
                LayerDraws::from_fn(agents, shape, || match parents {
                    ParentSet::Single(_) => 0,
                    ParentSet::Pair(..) => u8::from(rng.random::<bool>()),
                })
            })
            .collect();
        Self { agents, layers }
    }

    /// Copies every element from the same parent slot.
    #[must_use]
    pub fn uniform(agents: usize, shapes: &[LayerShape], slot: u8) -> Self {
        let layers = shapes
            .iter()
            .map(|&shape| LayerDraws::from_fn(agents, shape, || slot))
            .collect();
        Self { agents, layers }
    }

    /// Slots of the weights of layer `layer`, agent-major.
    #[must_use]
    pub fn weight_slots(&self, layer: usize) -> &[u8] {
        &self.layers[layer].weights
    }

    /// Slots of the biases of layer `layer`, agent-major.
    #[must_use]
    pub fn bias_slots(&self, layer: usize) -> &[u8] {
        &self.layers[layer].biases
    }
}

/// Uniform noise in `[-1, 1]` for every offspring element.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationNoise {
    agents: usize,
    layers: Vec<LayerDraws<f64>>,
}

impl MutationNoise {
    pub fn random<R>(rng: &mut R, agents: usize, shapes: &[LayerShape]) -> Self
    where
        R: Rng + ?Sized,
    {
        let layers = shapes
            .iter()
            .map(|&shape| LayerDraws::from_fn(agents, shape, || rng.random_range(-1.0..=1.0)))
            .collect();
        Self { agents, layers }
    }

    /// The same noise value everywhere.
    #[must_use]
    pub fn constant(agents: usize, shapes: &[LayerShape], u: f64) -> Self {
        let layers = shapes
            .iter()
            .map(|&shape| LayerDraws::from_fn(agents, shape, || u))
            .collect();
        Self { agents, layers }
    }

    #[must_use]
    pub fn weight_noise(&self, layer: usize) -> &[f64] {
        &self.layers[layer].weights
    }

    #[must_use]
    pub fn bias_noise(&self, layer: usize) -> &[f64] {
        &self.layers[layer].biases
    }
}

/// Produces a full new population of parameters from one or two parents.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct GeneticOperator {
    pub mutation: MutationShape,
}

impl GeneticOperator {
    #[must_use]
    pub const fn new(mutation: MutationShape) -> Self {
        Self { mutation }
    }

    /// Breeds as many offspring as `parameters` holds agents.
    ///
    /// The crossover plan is drawn before the mutation noise.
    pub fn breed<R>(
        &self,
        parameters: &NetworkParameters,
        parents: ParentSet,
        rng: &mut R,
    ) -> Result<NetworkParameters, TrainingError>
    where
        R: Rng + ?Sized,
    {
        parents.check_range(parameters.agents())?;
        let shapes = parameters.shapes();
        let plan = CrossoverPlan::random(rng, parameters.agents(), &shapes, parents);
        let noise = MutationNoise::random(rng, parameters.agents(), &shapes);
        self.breed_with(parameters, parents, &plan, &noise)
    }

    /// Breeds with pre-drawn crossover slots and mutation noise.
    pub fn breed_with(
        &self,
        parameters: &NetworkParameters,
        parents: ParentSet,
        plan: &CrossoverPlan,
        noise: &MutationNoise,
    ) -> Result<NetworkParameters, TrainingError> {
        let agents = parameters.agents();
        parents.check_range(agents)?;
        check_draws("crossover plan", plan.agents, &plan.layers, parameters)?;
        check_draws("mutation noise", noise.agents, &noise.layers, parameters)?;

        let layers = parameters
            .layers()
            .iter()
            .zip(&plan.layers)
            .zip(&noise.layers)
            .map(|((layer, slots), noise)| {
                let shape = layer.shape();
                let weights = self.offspring(
                    shape.weight_len(),
                    &slots.weights,
                    &noise.weights,
                    parents,
                    |p| layer.agent_weights(p),
                );
                let biases = self.offspring(
                    shape.bias_len(),
                    &slots.biases,
                    &noise.biases,
                    parents,
                    |p| layer.agent_biases(p),
                );
                LayerParameters::from_vecs(shape, agents, weights, biases)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NetworkParameters::new(agents, layers)?)
    }

    fn offspring<'a, F>(
        &self,
        len: usize,
        slots: &[u8],
        noise: &[f64],
        parents: ParentSet,
        source: F,
    ) -> Vec<f64>
    where
        F: Fn(usize) -> &'a [f64],
    {
        slots
            .iter()
            .zip(noise)
            .enumerate()
            .map(|(i, (&slot, &u))| {
                let value = source(parents.parent(slot))[i % len];
                zigzag(value + self.mutation.apply(u))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use dinorun_network::{LayerSpec, Topology};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    const AGENTS: usize = 6;

    fn parameters(seed: u64) -> NetworkParameters {
        let topology = Topology::new(5, vec![LayerSpec::new(3, 1), LayerSpec::new(4, 1)]).unwrap();
        // Values beyond [-1, 1] so that folding is observable.
        let base = NetworkParameters::random(&mut Pcg32::seed_from_u64(seed), AGENTS, &topology);
        let layers = base
            .layers()
            .iter()
            .map(|l| {
                LayerParameters::from_vecs(
                    l.shape(),
                    AGENTS,
                    l.weights().iter().map(|w| w * 2.5).collect(),
                    l.biases().iter().map(|b| b * 2.5).collect(),
                )
                .unwrap()
            })
            .collect();
        NetworkParameters::new(AGENTS, layers).unwrap()
    }

    fn assert_all_offspring_fold(
        offspring: &NetworkParameters,
        source: &NetworkParameters,
        parent: usize,
    ) {
        assert_eq!(offspring.agents(), AGENTS);
        for (child, layer) in offspring.layers().iter().zip(source.layers()) {
            for agent in 0..AGENTS {
                let expected = layer
                    .agent_weights(parent)
                    .iter()
                    .map(|&w| zigzag(w))
                    .collect::<Vec<_>>();
                assert_eq!(child.agent_weights(agent), expected.as_slice());
                let expected = layer
                    .agent_biases(parent)
                    .iter()
                    .map(|&b| zigzag(b))
                    .collect::<Vec<_>>();
                assert_eq!(child.agent_biases(agent), expected.as_slice());
            }
        }
    }

    mod parent_set {
        use super::*;

        #[test]
        fn test_accepts_one_or_two_distinct() {
            assert_eq!(ParentSet::new(&[3]).unwrap(), ParentSet::Single(3));
            assert_eq!(ParentSet::new(&[3, 1]).unwrap(), ParentSet::Pair(3, 1));
            assert!(ParentSet::new(&[]).is_err());
            assert!(ParentSet::new(&[2, 2]).is_err());
            assert!(ParentSet::new(&[1, 2, 3]).is_err());
        }

        #[test]
        fn test_slots() {
            let pair = ParentSet::Pair(4, 9);
            assert_eq!(pair.parent(0), 4);
            assert_eq!(pair.parent(1), 9);
            assert_eq!(ParentSet::Single(4).parent(1), 4);
            assert_eq!(pair.indices().collect::<Vec<_>>(), vec![4, 9]);
            assert_eq!(pair.count(), 2);
        }
    }

    mod breeding {
        use super::*;

        #[test]
        fn test_single_parent_without_mutation_is_folded_copy() {
            let params = parameters(1);
            let operator = GeneticOperator::new(MutationShape::Zero);
            let mut rng = Pcg32::seed_from_u64(2);
            let offspring = operator
                .breed(&params, ParentSet::Single(2), &mut rng)
                .unwrap();
            assert_all_offspring_fold(&offspring, &params, 2);
        }

        #[test]
        fn test_uniform_plan_selects_one_parent() {
            let params = parameters(3);
            let shapes = params.shapes();
            let operator = GeneticOperator::new(MutationShape::default());
            let plan = CrossoverPlan::uniform(AGENTS, &shapes, 1);
            let noise = MutationNoise::constant(AGENTS, &shapes, 0.0);
            let offspring = operator
                .breed_with(&params, ParentSet::Pair(0, 5), &plan, &noise)
                .unwrap();
            assert_all_offspring_fold(&offspring, &params, 5);
        }

        #[test]
        fn test_every_element_comes_from_a_parent() {
            let params = parameters(4);
            let parents = ParentSet::Pair(1, 3);
            let operator = GeneticOperator::new(MutationShape::Zero);
            let mut rng = Pcg32::seed_from_u64(5);
            let plan = CrossoverPlan::random(&mut rng, AGENTS, &params.shapes(), parents);
            let noise = MutationNoise::random(&mut rng, AGENTS, &params.shapes());
            let offspring = operator
                .breed_with(&params, parents, &plan, &noise)
                .unwrap();

            let mut used = [false; 2];
            for (i, (child, layer)) in offspring.layers().iter().zip(params.layers()).enumerate() {
                let len = layer.shape().weight_len();
                for (j, (&w, &slot)) in child.weights().iter().zip(plan.weight_slots(i)).enumerate() {
                    let parent = parents.parent(slot);
                    assert_eq!(w, zigzag(layer.agent_weights(parent)[j % len]));
                    used[usize::from(slot)] = true;
                }
            }
            assert_eq!(used, [true, true]);
        }

        #[test]
        fn test_mutation_is_added_before_folding() {
            let params = parameters(6);
            let shapes = params.shapes();
            let operator = GeneticOperator::new(MutationShape::Linear { scale: 0.5 });
            let plan = CrossoverPlan::uniform(AGENTS, &shapes, 0);
            let noise = MutationNoise::constant(AGENTS, &shapes, 1.0);
            let offspring = operator
                .breed_with(&params, ParentSet::Single(0), &plan, &noise)
                .unwrap();
            let parent = params.layers()[0].agent_biases(0);
            let child = offspring.layers()[0].agent_biases(AGENTS - 1);
            for (&c, &p) in child.iter().zip(parent) {
                assert_eq!(c, zigzag(p + 0.5));
            }
        }

        #[test]
        fn test_noise_is_within_unit_range() {
            let params = parameters(7);
            let noise = MutationNoise::random(&mut Pcg32::seed_from_u64(8), AGENTS, &params.shapes());
            for i in 0..params.layers().len() {
                assert!(noise.weight_noise(i).iter().all(|u| (-1.0..=1.0).contains(u)));
                assert!(noise.bias_noise(i).iter().all(|u| (-1.0..=1.0).contains(u)));
            }
        }

        #[test]
        fn test_breeding_is_reproducible() {
            let params = parameters(9);
            let operator = GeneticOperator::default();
            let a = operator
                .breed(&params, ParentSet::Pair(0, 1), &mut Pcg32::seed_from_u64(10))
                .unwrap();
            let b = operator
                .breed(&params, ParentSet::Pair(0, 1), &mut Pcg32::seed_from_u64(10))
                .unwrap();
            assert_eq!(a, b);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn test_parent_out_of_range() {
            let params = parameters(11);
            let mut rng = Pcg32::seed_from_u64(12);
            assert!(matches!(
                GeneticOperator::default().breed(&params, ParentSet::Pair(0, AGENTS), &mut rng),
                Err(TrainingError::ParentOutOfRange { index: AGENTS, len: AGENTS })
            ));
        }

        #[test]
        fn test_plan_shape_mismatch() {
            let params = parameters(13);
            let shapes = params.shapes();
            let plan = CrossoverPlan::uniform(AGENTS - 1, &shapes, 0);
            let noise = MutationNoise::constant(AGENTS, &shapes, 0.0);
            assert!(matches!(
                GeneticOperator::default().breed_with(&params, ParentSet::Single(0), &plan, &noise),
                Err(TrainingError::Network(NetworkError::ShapeMismatch {
                    what: "crossover plan",
                    ..
                }))
            ));
        }
    }
}
