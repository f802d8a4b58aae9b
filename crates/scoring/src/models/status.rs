use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum ScoreStatus {
    #[default]
    Scored,
    #[serde(alias = "cap")]
    Capped,
    Dnf,
    Dns,
    Withdrawn,
}

impl ScoreStatus {
    /// Most significant component of a sort key. Lower sorts first.
    pub fn sort_order(&self) -> u8 {
        match self {
            Self::Scored => 0,
            Self::Capped => 1,
            Self::Dnf => 2,
            Self::Dns => 3,
            Self::Withdrawn => 4,
        }
    }

    pub fn from_sort_order(order: u8) -> Option<Self> {
        match order {
            0 => Some(Self::Scored),
            1 => Some(Self::Capped),
            2 => Some(Self::Dnf),
            3 => Some(Self::Dns),
            4 => Some(Self::Withdrawn),
            _ => None,
        }
    }

    /// Scored and capped results compete on value; the rest never do.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Scored | Self::Capped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scored => "scored",
            Self::Capped => "capped",
            Self::Dnf => "dnf",
            Self::Dns => "dns",
            Self::Withdrawn => "withdrawn",
        }
    }
}
