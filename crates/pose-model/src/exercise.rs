//! Exercise identifiers and movement phases.

use serde::{Deserialize, Serialize};

/// A strength-training exercise identifier.
///
/// Parsing never fails: identifiers outside the known set are kept as
/// [`ExerciseType::Unknown`] so callers can fall back explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExerciseType {
    #[default]
    Squat,
    BackSquat,
    FrontSquat,
    GobletSquat,
    Deadlift,
    RomanianDeadlift,
    BenchPress,
    OverheadPress,
    MilitaryPress,
    /// An identifier outside the known set, kept verbatim.
    Unknown(String),
}

/// Exercise family: exercises in one family share angle and phase rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseFamily {
    Squat,
    Deadlift,
    BenchPress,
    OverheadPress,
    /// Unrecognized exercise.
    Generic,
}

impl ExerciseType {
    /// Parse an identifier such as `"back-squat"` or `"Romanian_Deadlift"`.
    pub fn parse(id: &str) -> Self {
        let normalized = id.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "squat" => Self::Squat,
            "back-squat" => Self::BackSquat,
            "front-squat" => Self::FrontSquat,
            "goblet-squat" => Self::GobletSquat,
            "deadlift" => Self::Deadlift,
            "romanian-deadlift" => Self::RomanianDeadlift,
            "bench-press" => Self::BenchPress,
            "overhead-press" => Self::OverheadPress,
            "military-press" => Self::MilitaryPress,
            _ => Self::Unknown(id.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Squat => "squat",
            Self::BackSquat => "back-squat",
            Self::FrontSquat => "front-squat",
            Self::GobletSquat => "goblet-squat",
            Self::Deadlift => "deadlift",
            Self::RomanianDeadlift => "romanian-deadlift",
            Self::BenchPress => "bench-press",
            Self::OverheadPress => "overhead-press",
            Self::MilitaryPress => "military-press",
            Self::Unknown(id) => id,
        }
    }

    pub fn family(&self) -> ExerciseFamily {
        match self {
            Self::Squat | Self::BackSquat | Self::FrontSquat | Self::GobletSquat => {
                ExerciseFamily::Squat
            }
            Self::Deadlift | Self::RomanianDeadlift => ExerciseFamily::Deadlift,
            Self::BenchPress => ExerciseFamily::BenchPress,
            Self::OverheadPress | Self::MilitaryPress => ExerciseFamily::OverheadPress,
            Self::Unknown(_) => ExerciseFamily::Generic,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for ExerciseType {
    fn from(id: String) -> Self {
        Self::parse(&id)
    }
}

impl From<&str> for ExerciseType {
    fn from(id: &str) -> Self {
        Self::parse(id)
    }
}

impl From<ExerciseType> for String {
    fn from(exercise: ExerciseType) -> Self {
        exercise.as_str().to_string()
    }
}

impl std::fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse stage of a repetition for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Lowering.
    Eccentric,
    Bottom,
    /// Lifting.
    Concentric,
    Top,
    /// Classification could not be made.
    Unknown,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Eccentric => "eccentric",
            Phase::Bottom => "bottom",
            Phase::Concentric => "concentric",
            Phase::Top => "top",
            Phase::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_identifiers() {
        assert_eq!(ExerciseType::parse("squat"), ExerciseType::Squat);
        assert_eq!(ExerciseType::parse("Front_Squat"), ExerciseType::FrontSquat);
        assert_eq!(
            ExerciseType::parse("romanian-deadlift"),
            ExerciseType::RomanianDeadlift
        );
        assert_eq!(
            ExerciseType::parse("military press"),
            ExerciseType::MilitaryPress
        );
    }

    #[test]
    fn test_unknown_identifier_is_kept() {
        let exercise = ExerciseType::parse("lunge");
        assert_eq!(exercise, ExerciseType::Unknown("lunge".to_string()));
        assert!(!exercise.is_recognized());
        assert_eq!(exercise.family(), ExerciseFamily::Generic);
        assert_eq!(exercise.as_str(), "lunge");
    }

    #[test]
    fn test_families() {
        assert_eq!(ExerciseType::GobletSquat.family(), ExerciseFamily::Squat);
        assert_eq!(ExerciseType::Deadlift.family(), ExerciseFamily::Deadlift);
        assert_eq!(ExerciseType::BenchPress.family(), ExerciseFamily::BenchPress);
        assert_eq!(
            ExerciseType::MilitaryPress.family(),
            ExerciseFamily::OverheadPress
        );
    }

    #[test]
    fn test_exercise_serializes_as_identifier() {
        let json = serde_json::to_string(&ExerciseType::BenchPress).unwrap();
        assert_eq!(json, "\"bench-press\"");
        let parsed: ExerciseType = serde_json::from_str("\"overhead-press\"").unwrap();
        assert_eq!(parsed, ExerciseType::OverheadPress);
    }

    #[test]
    fn test_phase_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Phase::Concentric).unwrap(),
            "\"concentric\""
        );
        assert_eq!(Phase::Unknown.to_string(), "unknown");
    }
}
