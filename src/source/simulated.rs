// src/source/simulated.rs — Seeded synthetic post generator for demos
//
// Produces posts shaped like a social feed: a random sentiment tag per post,
// a fraction of negative posts carrying an explicit complaint, and authors
// drawn from a pool of 1000 users. Output depends only on the seed and the
// call count, so runs are reproducible.

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{DataSource, FetchRequest};
use crate::core::types::Item;
use crate::infra::errors::MonitorError;

const AUTHOR_POOL: u32 = 1000;
const TAGS: [&str; 3] = ["POS", "NEG", "NEU"];
/// How often a negative post carries an explicit complaint.
const COMPLAINT_RATE: f64 = 0.2;

pub struct SimulatedSource {
    seed: u64,
    calls: AtomicU64,
}

impl SimulatedSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            calls: AtomicU64::new(0),
        }
    }

    fn generate(&self, call: u64, request: &FetchRequest) -> Vec<Item> {
        let mut rng = StdRng::seed_from_u64(self.seed ^ call);
        let now = Utc::now();
        (0..request.limit)
            .map(|i| {
                let tag = TAGS[rng.gen_range(0..TAGS.len())];
                let mut text = format!("{} simulated post {} - sentiment:{}", request.keyword, i, tag);
                if tag == "NEG" && rng.gen_bool(COMPLAINT_RATE) {
                    text.push_str(" this is bad!");
                }
                let author = rng.gen_range(1..=AUTHOR_POOL);
                Item::new(
                    format!("{}-{}-{}", request.keyword, call, i),
                    text,
                    format!("user_{author}"),
                    now,
                )
            })
            .collect()
    }
}

#[async_trait]
impl DataSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Item>, MonitorError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.generate(call, request))
    }
}
