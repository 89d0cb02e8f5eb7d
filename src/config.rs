//! Construction parameters and the builder that validates them.

use crate::error::ConfigError;
use crate::table::ChainedHashMap;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Bucket count a table starts with unless told otherwise.
pub const DEFAULT_BUCKETS: usize = 10;

/// Load factor at which an insert triggers a rehash.
pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 0.8;

/// Sizing parameters of a [`ChainedHashMap`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    /// Number of buckets allocated up front. Must be at least 1.
    pub initial_buckets: usize,
    /// Growth threshold: a rehash runs once `len / bucket_count` reaches it.
    pub max_load_factor: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_BUCKETS,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_buckets == 0 {
            return Err(ConfigError::ZeroBuckets);
        }
        if !(self.max_load_factor.is_finite() && self.max_load_factor > 0.0) {
            return Err(ConfigError::InvalidLoadFactor(self.max_load_factor));
        }
        Ok(())
    }
}

/// Builder for [`ChainedHashMap`], starting from [`Config::default`] and
/// `RandomState` hashing.
#[derive(Clone, Debug)]
pub struct Builder<S = RandomState> {
    config: Config,
    hasher: S,
}

impl Default for Builder<RandomState> {
    fn default() -> Self {
        Self {
            config: Config::default(),
            hasher: RandomState::new(),
        }
    }
}

impl Builder<RandomState> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> Builder<S> {
    pub fn buckets(mut self, n: usize) -> Self {
        self.config.initial_buckets = n;
        self
    }

    pub fn max_load_factor(mut self, lf: f32) -> Self {
        self.config.max_load_factor = lf;
        self
    }

    /// Replaces the hash builder, changing the builder's hasher type.
    pub fn hasher<T: BuildHasher>(self, hasher: T) -> Builder<T> {
        Builder {
            config: self.config,
            hasher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validates the parameters and allocates the bucket array.
    pub fn build<K, V>(self) -> Result<ChainedHashMap<K, V, S>, ConfigError>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        ChainedHashMap::with_config(self.config, self.hasher)
    }
}
