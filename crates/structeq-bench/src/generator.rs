//! Deterministic value-graph generator.
//!
//! Structure and leaf values are drawn from one [`StdRng`] seeded by
//! [`GeneratorConfig::seed`]; the element order of sets and maps is drawn
//! from a second, independent stream. Two calls with the same config and
//! different `order_seed`s therefore build structurally equal values that
//! only differ in unordered-container layout.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use structeq_core::{Record, Value};

/// Shape of the generated value graph.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for structure and leaf values.
    pub seed: u64,
    /// Children per container or members per record.
    pub breadth: usize,
    /// Container levels above the leaves.
    pub depth: usize,
    /// Share of containers built as records (0.0-1.0).
    pub record_fraction: f64,
    /// Share of containers built as sets (0.0-1.0).
    pub set_fraction: f64,
    /// Share of containers built as maps (0.0-1.0); the rest are lists.
    pub map_fraction: f64,
    /// Length of generated text leaves.
    pub text_len: usize,
    /// Leaf (in generation order) replaced by a sentinel, to build a value
    /// that differs from the unperturbed one in exactly one place.
    pub perturb_leaf: Option<usize>,
}

/// Predefined sizes for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// 4^3 = 64 leaves.
    Small,
    /// 6^4 = 1296 leaves.
    Medium,
    /// 8^5 = 32768 leaves.
    Large,
}

impl SizeTier {
    /// Mixed containers at this size.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        let (breadth, depth) = match self {
            SizeTier::Small => (4, 3),
            SizeTier::Medium => (6, 4),
            SizeTier::Large => (8, 5),
        };
        GeneratorConfig {
            seed,
            breadth,
            depth,
            record_fraction: 0.25,
            set_fraction: 0.25,
            map_fraction: 0.25,
            text_len: 12,
            perturb_leaf: None,
        }
    }

    /// Lists only: the ordered strategy throughout.
    pub fn ordered(self, seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            record_fraction: 0.0,
            set_fraction: 0.0,
            map_fraction: 0.0,
            ..self.config(seed)
        }
    }

    /// Sets only: the unordered strategy throughout.
    pub fn unordered(self, seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            record_fraction: 0.0,
            set_fraction: 1.0,
            map_fraction: 0.0,
            ..self.config(seed)
        }
    }
}

/// Builds a value with sets and maps in generation order.
pub fn generate_value(config: &GeneratorConfig) -> Value {
    Builder::new(config, None).container(config.depth)
}

/// Builds the same value as [`generate_value`] with set elements and map
/// entries shuffled by `order_seed`.
pub fn generate_shuffled(config: &GeneratorConfig, order_seed: u64) -> Value {
    Builder::new(config, Some(StdRng::seed_from_u64(order_seed))).container(config.depth)
}

/// Nests `levels` single-element lists around `Null`, without recursion.
pub fn nested_lists(levels: usize) -> Value {
    let mut value = Value::Null;
    for _ in 0..levels {
        value = Value::list([value]);
    }
    value
}

struct Builder<'c> {
    config: &'c GeneratorConfig,
    rng: StdRng,
    order: Option<StdRng>,
    leaves: usize,
}

impl<'c> Builder<'c> {
    fn new(config: &'c GeneratorConfig, order: Option<StdRng>) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(config.seed),
            order,
            leaves: 0,
        }
    }

    fn container(&mut self, depth: usize) -> Value {
        if depth == 0 {
            return self.leaf();
        }
        let breadth = self.config.breadth;
        let roll: f64 = self.rng.r#gen();
        let records = self.config.record_fraction;
        let sets = records + self.config.set_fraction;
        let maps = sets + self.config.map_fraction;

        if roll < records {
            let mut record = Record::new(format!("Level{depth}"));
            for i in 0..breadth {
                let child = self.container(depth - 1);
                record = record.with_field(format!("f{i}"), child);
            }
            Value::record(record)
        } else if roll < sets {
            let mut items: Vec<Value> = (0..breadth).map(|_| self.container(depth - 1)).collect();
            self.shuffle(&mut items);
            Value::set(items)
        } else if roll < maps {
            let mut entries: Vec<(Value, Value)> = (0..breadth)
                .map(|i| (Value::text(format!("k{i}")), self.container(depth - 1)))
                .collect();
            self.shuffle(&mut entries);
            Value::map(entries)
        } else {
            Value::list((0..breadth).map(|_| self.container(depth - 1)).collect::<Vec<_>>())
        }
    }

    fn leaf(&mut self) -> Value {
        let index = self.leaves;
        self.leaves += 1;
        let value = match self.rng.gen_range(0..4) {
            0 => Value::int(self.rng.gen_range(-1_000_000..1_000_000)),
            1 => Value::float(self.rng.gen_range(-1.0e6..1.0e6)),
            2 => {
                let text: String = (&mut self.rng)
                    .sample_iter(Alphanumeric)
                    .take(self.config.text_len)
                    .map(char::from)
                    .collect();
                Value::text(text)
            }
            _ => Value::Bool(self.rng.r#gen()),
        };
        if self.config.perturb_leaf == Some(index) {
            Value::text("perturbed")
        } else {
            value
        }
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        if let Some(order) = self.order.as_mut() {
            items.shuffle(order);
        }
    }
}
