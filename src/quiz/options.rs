use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of a question falls; the other side is what the player picks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The word falls, choices are readings.
    #[default]
    #[serde(alias = "かんじ")]
    WordGiven,
    /// The reading falls, choices are words.
    #[serde(alias = "よみがな")]
    ReadingGiven,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::WordGiven => "word → reading",
            Direction::ReadingGiven => "reading → word",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Direction::WordGiven => Direction::ReadingGiven,
            Direction::ReadingGiven => Direction::WordGiven,
        }
    }
}

/// How many questions a round asks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QuantityMode {
    Fixed(usize),
    All,
}

/// Choices offered by the menu, in cycling order.
pub const QUANTITY_CHOICES: [QuantityMode; 4] = [
    QuantityMode::Fixed(5),
    QuantityMode::Fixed(10),
    QuantityMode::Fixed(20),
    QuantityMode::All,
];

impl QuantityMode {
    pub fn cycle(self, forward: bool) -> Self {
        let idx = QUANTITY_CHOICES.iter().position(|q| *q == self).unwrap_or(1);
        let len = QUANTITY_CHOICES.len();
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        QUANTITY_CHOICES[next]
    }
}

impl fmt::Display for QuantityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityMode::Fixed(n) => write!(f, "{n}"),
            QuantityMode::All => f.write_str("all"),
        }
    }
}

impl TryFrom<String> for QuantityMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(QuantityMode::All);
        }
        trimmed
            .parse::<usize>()
            .map(QuantityMode::Fixed)
            .map_err(|_| format!("invalid quantity '{value}', expected a number or \"all\""))
    }
}

impl From<QuantityMode> for String {
    fn from(value: QuantityMode) -> Self {
        value.to_string()
    }
}

/// Difficulty level 1 (slowest) to 5 (fastest).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Difficulty(u8);

const DIFFICULTY_MULTIPLIERS: [f64; 5] = [1.6, 1.3, 1.0, 0.8, 0.6];

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(level: u8) -> Self {
        Self(level.clamp(Self::MIN, Self::MAX))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn multiplier(self) -> f64 {
        DIFFICULTY_MULTIPLIERS[(self.0 - Self::MIN) as usize]
    }

    pub fn fall_duration_ms(self, base_ms: u64) -> u64 {
        (base_ms as f64 * self.multiplier()).round() as u64
    }

    pub fn harder(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    pub fn easier(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(3)
    }
}

impl From<u8> for Difficulty {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.0
    }
}

/// Everything read from the menu/config when a round starts.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundOptions {
    pub set_id: String,
    pub quantity: QuantityMode,
    pub direction: Direction,
    pub difficulty: Difficulty,
    pub base_fall_ms: u64,
    pub lives_max: u32,
    pub settle_delay_ms: u64,
}

impl RoundOptions {
    pub fn fall_duration_ms(&self) -> u64 {
        self.difficulty.fall_duration_ms(self.base_fall_ms)
    }
}

impl Default for RoundOptions {
    fn default() -> Self {
        Self {
            set_id: "1nen".to_string(),
            quantity: QuantityMode::Fixed(10),
            direction: Direction::default(),
            difficulty: Difficulty::default(),
            base_fall_ms: 3000,
            lives_max: 3,
            settle_delay_ms: 400,
        }
    }
}
