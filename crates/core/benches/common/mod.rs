use std::env;
use std::time::Duration;

use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, Throughput};

use unifex_core::{BBox, CoordinateInfo, Page, TextBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchTier {
    Quick,
    Full,
}

impl BenchTier {
    pub fn from_env() -> Self {
        match env::var("UNIFEX_BENCH_TIER").as_deref() {
            Ok("full") => Self::Full,
            _ => Self::Quick,
        }
    }

    /// Fragments per synthetic page.
    pub fn words_per_page(self) -> usize {
        match self {
            Self::Quick => 400,
            Self::Full => 4_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub tier: BenchTier,
    pub seed: u64,
    pub sample_size: usize,
    pub measurement: Duration,
}

pub fn bench_config() -> BenchConfig {
    let tier = BenchTier::from_env();
    let seed = env::var("UNIFEX_BENCH_SEED")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0xC0FFEE);
    let (sample_size, measurement) = match tier {
        BenchTier::Quick => (20, Duration::from_secs(3)),
        BenchTier::Full => (30, Duration::from_secs(8)),
    };

    BenchConfig {
        tier,
        seed,
        sample_size,
        measurement,
    }
}

pub fn configure_group<M: Measurement>(group: &mut BenchmarkGroup<'_, M>, cfg: &BenchConfig) {
    group.sample_size(cfg.sample_size);
    group.measurement_time(cfg.measurement);
}

pub fn blocks_throughput(blocks: usize) -> Throughput {
    Throughput::Elements(blocks as u64)
}

#[derive(Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    pub fn gen_f64(&mut self, min: f64, max: f64) -> f64 {
        let n = self.next_u64() as f64 / u64::MAX as f64;
        min + (max - min) * n
    }

    pub fn gen_index(&mut self, len: usize) -> usize {
        (self.next_u64() % len as u64) as usize
    }
}

const WORDS: &[&str] = &[
    "invoice", "total", "amount", "due", "First", "page", "account", "number", "date", "tax",
    "Net", "balance", "payment", "reference", "customer",
];

/// A letter-size page of word fragments laid out in jittered lines, shuffled
/// so storage order is not reading order.
pub fn synthetic_page(rng: &mut XorShift64, number: usize, words: usize) -> Page {
    let mut texts = Vec::with_capacity(words);
    let (mut x, mut y) = (36.0, 36.0);

    for _ in 0..words {
        let word = WORDS[rng.gen_index(WORDS.len())];
        let width = word.len() as f64 * 5.5;
        if x + width > 576.0 {
            x = 36.0;
            y += 14.0;
        }
        let jitter = rng.gen_f64(-0.8, 0.8);
        let bbox = BBox::from_corners((x, y + jitter), (x + width, y + jitter + 10.0));
        texts.push(TextBlock::new(word, bbox).with_confidence(rng.gen_f64(0.5, 1.0)));
        x += width + rng.gen_f64(2.0, 9.0);
    }

    for i in (1..texts.len()).rev() {
        texts.swap(i, rng.gen_index(i + 1));
    }

    Page::new(number, 612.0, 792.0)
        .with_texts(texts)
        .with_coordinate_info(CoordinateInfo::points())
}
