use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::problem::{Operator, OperatorFamily};

/// Preset difficulty, selects the operand ranges
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn ranges(&self) -> Ranges {
        match self {
            Difficulty::Easy => Ranges {
                addition: OperandRange::new(2, 60, 2, 60),
                multiplication: OperandRange::new(2, 12, 2, 20),
            },
            Difficulty::Medium => Ranges {
                addition: OperandRange::new(2, 100, 2, 100),
                multiplication: OperandRange::new(2, 12, 2, 100),
            },
            Difficulty::Hard => Ranges {
                addition: OperandRange::new(2, 300, 2, 300),
                multiplication: OperandRange::new(2, 20, 2, 200),
            },
        }
    }
}

/// Inclusive bounds for the two operands of an operator family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandRange {
    pub min_a: i64,
    pub max_a: i64,
    pub min_b: i64,
    pub max_b: i64,
}

impl OperandRange {
    pub fn new(min_a: i64, max_a: i64, min_b: i64, max_b: i64) -> Self {
        Self {
            min_a,
            max_a,
            min_b,
            max_b,
        }
    }

    fn validate(&self, family: OperatorFamily) -> Result<(), ConfigError> {
        for (field, min, max) in [("a", self.min_a, self.max_a), ("b", self.min_b, self.max_b)] {
            if min > max {
                return Err(ConfigError::InvertedRange {
                    family,
                    field,
                    min,
                    max,
                });
            }
        }
        if family == OperatorFamily::Multiplicative && self.min_b < 2 {
            return Err(ConfigError::DivisorTooSmall {
                family,
                min_b: self.min_b,
            });
        }
        if !self.corners_fit(family) {
            return Err(ConfigError::RangeTooLarge { family });
        }
        Ok(())
    }

    /// Sums, differences and products over the range peak at its corners
    fn corners_fit(&self, family: OperatorFamily) -> bool {
        let corners = [
            (self.min_a, self.min_b),
            (self.min_a, self.max_b),
            (self.max_a, self.min_b),
            (self.max_a, self.max_b),
        ];
        corners.iter().all(|&(a, b)| match family {
            OperatorFamily::Additive => {
                a.checked_add(b).is_some()
                    && a.checked_sub(b).is_some()
                    && b.checked_sub(a).is_some()
            }
            OperatorFamily::Multiplicative => a.checked_mul(b).is_some(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranges {
    pub addition: OperandRange,
    pub multiplication: OperandRange,
}

impl Ranges {
    pub fn for_family(&self, family: OperatorFamily) -> OperandRange {
        match family {
            OperatorFamily::Additive => self.addition,
            OperatorFamily::Multiplicative => self.multiplication,
        }
    }
}

/// Everything needed to run one timed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub duration_secs: u64,
    pub difficulty: Difficulty,
    pub operators: Vec<Operator>,
    pub ranges: Ranges,
}

impl SessionConfig {
    /// Config using the preset ranges of `difficulty`. Duplicate operators are dropped.
    pub fn new(duration_secs: u64, difficulty: Difficulty, operators: Vec<Operator>) -> Self {
        let mut unique = Vec::with_capacity(operators.len());
        for op in operators {
            if !unique.contains(&op) {
                unique.push(op);
            }
        }

        Self {
            duration_secs,
            difficulty,
            operators: unique,
            ranges: difficulty.ranges(),
        }
    }

    pub fn with_ranges(mut self, ranges: Ranges) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_secs == 0 {
            return Err(ConfigError::NonPositiveDuration);
        }
        if self.operators.is_empty() {
            return Err(ConfigError::EmptyOperators);
        }
        self.ranges.addition.validate(OperatorFamily::Additive)?;
        self.ranges
            .multiplication
            .validate(OperatorFamily::Multiplicative)?;
        Ok(())
    }
}

impl From<&Preferences> for SessionConfig {
    fn from(prefs: &Preferences) -> Self {
        SessionConfig::new(prefs.duration_secs, prefs.difficulty, prefs.operators.clone())
    }
}

/// Last used settings, remembered between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Preferences {
    pub duration_secs: u64,
    pub difficulty: Difficulty,
    pub operators: Vec<Operator>,
    pub smoothing_window: usize,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            duration_secs: 60,
            difficulty: Difficulty::Medium,
            operators: Operator::ALL.to_vec(),
            smoothing_window: crate::analytics::DEFAULT_SMOOTHING_WINDOW,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Preferences;
    fn save(&self, prefs: &Preferences) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "mathrush") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("mathrush_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Preferences {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Preferences>(&bytes) {
                Ok(prefs) => return prefs,
                Err(e) => {
                    tracing::warn!("ignoring unreadable config {}: {e}", self.path.display())
                }
            }
        }
        Preferences::default()
    }

    fn save(&self, prefs: &Preferences) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(prefs)?;
        fs::write(&self.path, data)
    }
}
