use serde::Deserialize;
use serde::Serialize;

/// Server region; decides when the weekly reset happens.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    America,
    Asia,
    Europe,
    #[default]
    Default,
}

impl Zone {
    /// Fixed offset from UTC in hours.
    pub const fn offset(&self) -> i64 {
        match self {
            Self::America => -6,
            Self::Asia => 8,
            Self::Europe => 0,
            Self::Default => 0,
        }
    }
}
