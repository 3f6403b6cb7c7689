use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

/// Badge bucket used by the list view; `A+` and `A` share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GradeTier {
    Excellent,
    Good,
    Satisfactory,
    Attention,
}

/// Ordered high to low; the first threshold the marks reach wins.
const THRESHOLDS: [(i64, Grade); 5] = [
    (90, Grade::APlus),
    (80, Grade::A),
    (70, Grade::B),
    (60, Grade::C),
    (50, Grade::D),
];

/// Maps marks to a letter grade. Total: no range check, so anything at or
/// above 90 is `A+` and anything below 50 is `F`.
pub fn derive_grade(marks: i64) -> Grade {
    THRESHOLDS
        .iter()
        .find(|(min, _)| marks >= *min)
        .map(|(_, g)| *g)
        .unwrap_or(Grade::F)
}

impl Grade {
    pub fn label(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub fn tier(self) -> GradeTier {
        match self {
            Grade::APlus | Grade::A => GradeTier::Excellent,
            Grade::B => GradeTier::Good,
            Grade::C => GradeTier::Satisfactory,
            Grade::D | Grade::F => GradeTier::Attention,
        }
    }

    /// Performance summary shown on the details card.
    pub fn remark(self) -> &'static str {
        match self.tier() {
            GradeTier::Excellent => "Excellent performance! Keep up the great work.",
            GradeTier::Good => "Good job, but there is room for improvement.",
            GradeTier::Satisfactory => "Satisfactory. Needs more focus on core concepts.",
            GradeTier::Attention => "Needs immediate attention and remedial support.",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Grade {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A+" => Ok(Grade::APlus),
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            "F" => Ok(Grade::F),
            other => Err(ValidationError::InvalidGrade(other.to_string())),
        }
    }
}
