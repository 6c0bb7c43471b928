use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Registry group code that marks a subject as a control.
pub const DEFAULT_CONTROL_GROUP_CODE: i64 = 5;

/// One of the two disjoint subject groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cohort {
    Case,
    Ctrl,
}

impl Cohort {
    /// Classify a subject from its registry group code.
    ///
    /// Only an exact match on the control code yields `Ctrl`; an absent or
    /// unparseable code is a case.
    pub fn from_group_code(code: Option<i64>, control_code: i64) -> Self {
        if code == Some(control_code) {
            Cohort::Ctrl
        } else {
            Cohort::Case
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cohort::Case => "CASE",
            Cohort::Ctrl => "CTRL",
        }
    }

    /// The `<COHORT>-` prefix a participant identifier starts with.
    pub fn prefix(&self) -> String {
        format!("{}-", self.as_str())
    }
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cohort {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CASE" => Ok(Cohort::Case),
            "CTRL" => Ok(Cohort::Ctrl),
            _ => Err(ModelError::UnknownCohort(s.to_string())),
        }
    }
}

/// Parse an integer-like registry group code (`"5"`, `" 5 "`, `"5.0"`).
pub fn parse_group_code(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

/// Derived `<COHORT>-<SubjectUID>` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId {
    pub cohort: Cohort,
    pub subject_uid: String,
}

impl ParticipantId {
    pub fn new(cohort: Cohort, subject_uid: impl Into<String>) -> Self {
        Self {
            cohort,
            subject_uid: subject_uid.into(),
        }
    }

    /// Identifier every subject receives before reclassification.
    pub fn initial(subject_uid: impl Into<String>) -> Self {
        Self::new(Cohort::Case, subject_uid)
    }

    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let Some((prefix, uid)) = raw.split_once('-') else {
            return Err(ModelError::InvalidParticipantId(raw.to_string()));
        };
        if uid.is_empty() {
            return Err(ModelError::InvalidParticipantId(raw.to_string()));
        }
        let cohort = prefix
            .parse::<Cohort>()
            .map_err(|_| ModelError::InvalidParticipantId(raw.to_string()))?;
        Ok(Self::new(cohort, uid))
    }

    pub fn with_cohort(&self, cohort: Cohort) -> Self {
        Self::new(cohort, self.subject_uid.clone())
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.cohort, self.subject_uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_code_parsing_accepts_integer_like_text() {
        assert_eq!(parse_group_code("5"), Some(5));
        assert_eq!(parse_group_code(" 5 "), Some(5));
        assert_eq!(parse_group_code("5.0"), Some(5));
        assert_eq!(parse_group_code("5.5"), None);
        assert_eq!(parse_group_code(""), None);
        assert_eq!(parse_group_code("ctrl"), None);
    }

    #[test]
    fn only_control_code_is_ctrl() {
        assert_eq!(Cohort::from_group_code(Some(5), 5), Cohort::Ctrl);
        assert_eq!(Cohort::from_group_code(Some(2), 5), Cohort::Case);
        assert_eq!(Cohort::from_group_code(None, 5), Cohort::Case);
    }

    #[test]
    fn participant_id_keeps_hyphenated_uids() {
        let id = ParticipantId::parse("CTRL-NB-0042").expect("parse");
        assert_eq!(id.cohort, Cohort::Ctrl);
        assert_eq!(id.subject_uid, "NB-0042");
        assert_eq!(id.to_string(), "CTRL-NB-0042");
    }

    #[test]
    fn participant_id_rejects_unknown_prefix() {
        assert!(ParticipantId::parse("CAS-1001").is_err());
        assert!(ParticipantId::parse("CASE-").is_err());
        assert!(ParticipantId::parse("1001").is_err());
    }
}
