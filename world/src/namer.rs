//! Cosmetic name pools for newly created units.

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Names handed out when no custom list is provided.
pub const INFANTRY_NAMES: [&str; 5] = ["Infantry", "Grenadiers", "Halbardiers", "Guards", "Marines"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    Numbered,
    Unnumbered,
}

/// Sequence generator producing display names for units.
///
/// Unnumbered pools hand out each name once; when they run dry the namer
/// switches permanently to numbered names such as `"3rd Guards"`.
#[derive(Clone, Debug)]
pub struct Namer {
    original: Vec<String>,
    pool: Vec<String>,
    next_number: u32,
    strategy: Strategy,
    rng: ChaCha8Rng,
}

impl Namer {
    /// Creates a namer drawing from `names`.
    ///
    /// Custom lists are shuffled; an empty list falls back to [`INFANTRY_NAMES`].
    #[must_use]
    pub fn new(names: Vec<String>, numbered: bool, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (original, pool) = if names.is_empty() {
            let defaults: Vec<String> = INFANTRY_NAMES.iter().map(|name| (*name).to_owned()).collect();
            (defaults.clone(), defaults)
        } else {
            let mut pool = names.clone();
            pool.shuffle(&mut rng);
            (names, pool)
        };

        Self {
            original,
            pool,
            next_number: 1,
            strategy: if numbered {
                Strategy::Numbered
            } else {
                Strategy::Unnumbered
            },
            rng,
        }
    }

    /// Numbered namer over the default infantry names.
    #[must_use]
    pub fn infantry(seed: u64) -> Self {
        Self::new(Vec::new(), true, seed)
    }

    /// Reports whether the namer currently produces numbered names.
    #[must_use]
    pub fn is_numbered(&self) -> bool {
        self.strategy == Strategy::Numbered
    }

    /// Produces the next name.
    pub fn next_name(&mut self) -> String {
        if self.strategy == Strategy::Unnumbered {
            if let Some(name) = self.pool.pop() {
                return name;
            }
            tracing::warn!("name pool exhausted, switching to numbered names");
            self.strategy = Strategy::Numbered;
        }

        let number = self.next_number;
        self.next_number = self.next_number.saturating_add(1);
        let base = self
            .original
            .choose(&mut self.rng)
            .map_or(INFANTRY_NAMES[0], String::as_str);
        format!("{} {base}", ordinal(number))
    }
}

/// English ordinal form of `number`, e.g. `"21st"` or `"112th"`.
#[must_use]
pub fn ordinal(number: u32) -> String {
    let suffix = match (number % 10, number % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{number}{suffix}")
}
