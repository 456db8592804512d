use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SprayRecommendation {
    SprayNow,
    DoNotSpray,
    /// Inputs were unavailable; no verdict either way
    Error,
}

impl SprayRecommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SprayRecommendation::SprayNow => "SPRAY NOW",
            SprayRecommendation::DoNotSpray => "DO NOT SPRAY",
            SprayRecommendation::Error => "ERROR",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            SprayRecommendation::SprayNow => "✔",
            SprayRecommendation::DoNotSpray => "✘",
            SprayRecommendation::Error => "?",
        }
    }
}

impl std::fmt::Display for SprayRecommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprayWindowDecision {
    pub recommendation: SprayRecommendation,
    pub reason: String,
    /// Id of the veto rule that blocked spraying, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vetoed_by: Option<String>,
}

impl SprayWindowDecision {
    pub fn spray_now(reason: impl Into<String>) -> Self {
        Self {
            recommendation: SprayRecommendation::SprayNow,
            reason: reason.into(),
            vetoed_by: None,
        }
    }

    pub fn do_not_spray(rule_id: &str, reason: impl Into<String>) -> Self {
        Self {
            recommendation: SprayRecommendation::DoNotSpray,
            reason: reason.into(),
            vetoed_by: Some(rule_id.to_string()),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            recommendation: SprayRecommendation::Error,
            reason: reason.into(),
            vetoed_by: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.recommendation == SprayRecommendation::Error
    }
}
