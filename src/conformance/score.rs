//! Score-to-grade mapping for conformance reports.

use serde::{Deserialize, Serialize};

/// Letter grade for a conformance score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 95.0 {
            Grade::APlus
        } else if score >= 85.0 {
            Grade::A
        } else if score >= 75.0 {
            Grade::B
        } else if score >= 65.0 {
            Grade::C
        } else if score >= 50.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    /// Display label as emitted in reports
    pub fn label(&self) -> &'static str {
        match self {
            Grade::APlus => "A+ (Отлично)",
            Grade::A => "A (Очень хорошо)",
            Grade::B => "B (Хорошо)",
            Grade::C => "C (Удовлетворительно)",
            Grade::D => "D (Требует доработки)",
            Grade::F => "F (Неудовлетворительно)",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
