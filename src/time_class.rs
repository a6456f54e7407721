/// Session length bucket, named after chess time controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TimeClass {
    Bullet,
    Blitz,
    Rapid,
}

impl TimeClass {
    pub const ALL: [TimeClass; 3] = [TimeClass::Bullet, TimeClass::Blitz, TimeClass::Rapid];

    pub fn of(duration_secs: u64) -> Self {
        match duration_secs {
            0..=60 => TimeClass::Bullet,
            61..=300 => TimeClass::Blitz,
            _ => TimeClass::Rapid,
        }
    }

    /// Durations offered as presets for this class
    pub fn presets(&self) -> &'static [u64] {
        match self {
            TimeClass::Bullet => &[30, 45, 60],
            TimeClass::Blitz => &[120, 180, 300],
            TimeClass::Rapid => &[600, 900, 1800],
        }
    }
}

/// `45s`, `2m`, `1m 30s`
pub fn format_duration(secs: u64) -> String {
    let (mins, rest) = (secs / 60, secs % 60);
    match (mins, rest) {
        (0, s) => format!("{s}s"),
        (m, 0) => format!("{m}m"),
        (m, s) => format!("{m}m {s}s"),
    }
}

/// `m:ss` countdown display
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
