use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
};

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::{config::ReplyPools, section::Section};

/// Pick one entry uniformly at random. Repeats are allowed.
pub fn select_reply<'a, R: Rng + ?Sized>(pool: &'a [String], rng: &mut R) -> Option<&'a str> {
    if pool.is_empty() {
        return None;
    }
    let index = rng.random_range(0..pool.len());
    Some(pool[index].as_str())
}

/// Canned replies for the free-form stage and contextual nudges
pub struct ResponseSelector {
    general: Vec<String>,
    contextual: BTreeMap<Section, Vec<String>>,
    rng: Mutex<StdRng>,
}

impl ResponseSelector {
    pub fn new(pools: &ReplyPools, rng: StdRng) -> Self {
        Self {
            general: pools.general.clone(),
            contextual: pools.contextual.clone(),
            rng: Mutex::new(rng),
        }
    }

    /// Seeded selector, or one seeded from the OS when `seed` is `None`
    pub fn with_seed(pools: &ReplyPools, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(pools, rng)
    }

    pub fn general_pool(&self) -> &[String] {
        &self.general
    }

    pub fn contextual_pool(&self, section: Section) -> &[String] {
        self.contextual
            .get(&section)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Reply to a free-form utterance. The utterance itself is not looked at.
    pub fn reply(&self) -> Option<String> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        select_reply(&self.general, &mut *rng).map(str::to_string)
    }

    /// Unprompted message for the section the visitor just scrolled into
    pub fn nudge(&self, section: Section) -> Option<String> {
        let pool = self.contextual_pool(section);
        if pool.is_empty() {
            debug!(%section, "no contextual pool for section");
            return None;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        select_reply(pool, &mut *rng).map(str::to_string)
    }
}
