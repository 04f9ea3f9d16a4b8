// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deduplication of generated stores within one run.

use crate::constants::eso::{STORE_NAME_INFIX, STORE_NAME_SUFFIX_LEN};
use crate::types::SecretStore;
use rand::Rng;
use tracing::debug;

/// Source of the random suffix in generated store names
pub trait NameGenerator {
    fn suffix(&mut self) -> String;
}

/// Lowercase ASCII letters from the thread local RNG
#[derive(Debug, Default)]
pub struct RandomSuffix;

impl NameGenerator for RandomSuffix {
    fn suffix(&mut self) -> String {
        let mut rng = rand::thread_rng();
        (0..STORE_NAME_SUFFIX_LEN)
            .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
            .collect()
    }
}

/// Stores generated so far in this run, in registration order
#[derive(Debug, Default)]
pub struct StoreRegistry<G = RandomSuffix> {
    stores: Vec<SecretStore>,
    names: G,
}

impl StoreRegistry<RandomSuffix> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: NameGenerator> StoreRegistry<G> {
    pub fn with_generator(names: G) -> Self {
        Self {
            stores: Vec::new(),
            names,
        }
    }

    /// Return the registered store equivalent to `store`, or name and register it.
    ///
    /// The flag is true when the store was not seen before and still has to
    /// be written.
    pub fn register(&mut self, mut store: SecretStore, backend_type: &str) -> (SecretStore, bool) {
        if let Some(existing) = self.stores.iter().find(|s| s.same_backend(&store)) {
            debug!("Reusing store {}", existing.name());
            return (existing.clone(), false);
        }

        store.metadata.name = Some(format!(
            "{}-{}-{}",
            backend_type.to_lowercase(),
            STORE_NAME_INFIX,
            self.names.suffix()
        ));
        self.stores.push(store.clone());
        (store, true)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

/// Counter based suffixes for predictable names in tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SequentialSuffix(usize);

#[cfg(test)]
impl NameGenerator for SequentialSuffix {
    fn suffix(&mut self) -> String {
        self.0 += 1;
        format!("{:08}", self.0)
    }
}
