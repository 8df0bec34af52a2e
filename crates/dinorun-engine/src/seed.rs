use std::fmt::Write as _;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed of an environment's obstacle stream.
///
/// Two environments created from the same seed and fed the same actions and
/// time steps produce identical runs. Serialized as a 32-character hex string.
///
/// # Example
///
/// ```
/// use dinorun_engine::{Environment, GameConfig, SpawnSeed};
/// use rand::Rng as _;
///
/// let seed: SpawnSeed = rand::rng().random();
/// let config = GameConfig::default();
/// let a = Environment::new(&config, seed).unwrap();
/// let b = Environment::new(&config, seed).unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnSeed([u8; 16]);

impl SpawnSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub(crate) fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl Serialize for SpawnSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").unwrap();
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for SpawnSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid spawn seed: expected 32 hex characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16).map_err(|e| {
            serde::de::Error::custom(format!("invalid spawn seed: {hex_str} ({e})"))
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<SpawnSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SpawnSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        SpawnSeed(seed)
    }
}
