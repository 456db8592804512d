use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disease {
    AppleScab,
    AlternariaBlotch,
    MarssoninaBlotch,
    PowderyMildew,
    CedarAppleRust,
    BlackRot,
    BitterRot,
}

impl Disease {
    pub const ALL: [Disease; 7] = [
        Disease::AppleScab,
        Disease::AlternariaBlotch,
        Disease::MarssoninaBlotch,
        Disease::PowderyMildew,
        Disease::CedarAppleRust,
        Disease::BlackRot,
        Disease::BitterRot,
    ];

    pub fn all() -> &'static [Disease] {
        &Self::ALL
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Disease::AppleScab => "Apple Scab",
            Disease::AlternariaBlotch => "Alternaria Blotch",
            Disease::MarssoninaBlotch => "Marssonina Blotch",
            Disease::PowderyMildew => "Powdery Mildew",
            Disease::CedarAppleRust => "Cedar - Apple Rust",
            Disease::BlackRot => "Black Rot",
            Disease::BitterRot => "Bitter Rot",
        }
    }

    /// Config key, matches the serde representation
    pub fn key(&self) -> &'static str {
        match self {
            Disease::AppleScab => "apple_scab",
            Disease::AlternariaBlotch => "alternaria_blotch",
            Disease::MarssoninaBlotch => "marssonina_blotch",
            Disease::PowderyMildew => "powdery_mildew",
            Disease::CedarAppleRust => "cedar_apple_rust",
            Disease::BlackRot => "black_rot",
            Disease::BitterRot => "bitter_rot",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "applescab" | "scab" => Some(Disease::AppleScab),
            "alternariablotch" | "alternaria" => Some(Disease::AlternariaBlotch),
            "marssoninablotch" | "marssonina" => Some(Disease::MarssoninaBlotch),
            "powderymildew" | "mildew" => Some(Disease::PowderyMildew),
            "cedarapplerust" | "cedarrust" => Some(Disease::CedarAppleRust),
            "blackrot" => Some(Disease::BlackRot),
            "bitterrot" => Some(Disease::BitterRot),
            _ => None,
        }
    }
}

impl std::fmt::Display for Disease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskStatus {
    NoRisk,
    Low,
    Medium,
    High,
}

impl RiskStatus {
    /// Status banding for models that produce a continuous score
    pub fn from_value(value: u8) -> Self {
        if value >= 70 {
            RiskStatus::High
        } else if value >= 40 {
            RiskStatus::Medium
        } else {
            RiskStatus::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskStatus::NoRisk => "No Risk",
            RiskStatus::Low => "Low",
            RiskStatus::Medium => "Medium",
            RiskStatus::High => "High",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            RiskStatus::NoRisk => " ",
            RiskStatus::Low => "·",
            RiskStatus::Medium => "⚠",
            RiskStatus::High => "!",
        }
    }
}

impl std::fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Score produced by a single disease model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    pub value: u8,
    pub status: RiskStatus,
}

impl RiskScore {
    pub const NONE: RiskScore = RiskScore {
        value: 0,
        status: RiskStatus::NoRisk,
    };

    pub const fn new(value: u8, status: RiskStatus) -> Self {
        Self { value, status }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseRiskAssessment {
    pub disease: Disease,
    pub name: String,
    pub value: u8,
    pub status: RiskStatus,
}

impl DiseaseRiskAssessment {
    pub fn new(disease: Disease, score: RiskScore) -> Self {
        Self {
            disease,
            name: disease.as_str().to_string(),
            value: score.value,
            status: score.status,
        }
    }
}

/// Which disease's risk drives the spray decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiseaseFocus {
    Riskiest,
    Single(Disease),
}

impl DiseaseFocus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "riskiest" | "highest" | "max" => Some(DiseaseFocus::Riskiest),
            other => Disease::from_str(other).map(DiseaseFocus::Single),
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            DiseaseFocus::Riskiest => "riskiest",
            DiseaseFocus::Single(disease) => disease.key(),
        }
    }

    /// Pick the assessment this focus refers to
    pub fn select<'a>(
        &self,
        assessments: &'a [DiseaseRiskAssessment],
    ) -> Option<&'a DiseaseRiskAssessment> {
        match self {
            // Ties go to the earlier disease in evaluation order
            DiseaseFocus::Riskiest => assessments
                .iter()
                .rev()
                .max_by_key(|a| (a.value, a.status)),
            DiseaseFocus::Single(disease) => assessments.iter().find(|a| a.disease == *disease),
        }
    }
}

impl Serialize for DiseaseFocus {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_key())
    }
}

impl<'de> Deserialize<'de> for DiseaseFocus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let value = String::deserialize(deserializer)?;
        DiseaseFocus::from_str(&value).ok_or_else(|| {
            D::Error::custom(format!(
                "unknown primary disease '{}' - use 'riskiest' or a disease key such as 'apple_scab'",
                value
            ))
        })
    }
}

impl std::fmt::Display for DiseaseFocus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiseaseFocus::Riskiest => write!(f, "Riskiest disease"),
            DiseaseFocus::Single(disease) => write!(f, "{}", disease),
        }
    }
}
