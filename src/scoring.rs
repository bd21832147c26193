//! Interview sub-scores and the derived `totalMarks`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::utils::json::nullable;

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 10;

/// The five evaluation dimensions recorded during an interview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScores {
    pub punctuality: Option<i32>,
    pub preparedness: Option<i32>,
    pub communication_skills: Option<i32>,
    pub experience_required: Option<i32>,
    pub qualification_required: Option<i32>,
}

impl SubScores {
    fn named(&self) -> [(&'static str, Option<i32>); 5] {
        [
            ("punctuality", self.punctuality),
            ("preparedness", self.preparedness),
            ("communicationSkills", self.communication_skills),
            ("experienceRequired", self.experience_required),
            ("qualificationRequired", self.qualification_required),
        ]
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in self.named() {
            if let Some(value) = value {
                if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                    return Err(ValidationError::ScoreOutOfRange { field, value });
                }
            }
        }
        Ok(())
    }

    /// Sum of the sub-scores, absent ones counting as zero.
    pub fn total(&self) -> i32 {
        self.named()
            .iter()
            .map(|(_, value)| value.unwrap_or(0))
            .sum()
    }

    pub fn apply(&self, patch: &SubScoresPatch) -> SubScores {
        SubScores {
            punctuality: patch.punctuality.unwrap_or(self.punctuality),
            preparedness: patch.preparedness.unwrap_or(self.preparedness),
            communication_skills: patch
                .communication_skills
                .unwrap_or(self.communication_skills),
            experience_required: patch
                .experience_required
                .unwrap_or(self.experience_required),
            qualification_required: patch
                .qualification_required
                .unwrap_or(self.qualification_required),
        }
    }
}

/// Sub-score changes carried by an update: omitted keeps, `null` clears.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScoresPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub punctuality: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub preparedness: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub communication_skills: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub experience_required: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub qualification_required: Option<Option<i32>>,
}

impl SubScoresPatch {
    pub fn touches_any(&self) -> bool {
        self.punctuality.is_some()
            || self.preparedness.is_some()
            || self.communication_skills.is_some()
            || self.experience_required.is_some()
            || self.qualification_required.is_some()
    }
}

/// Outcome of re-scoring a record after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rescored {
    pub scores: SubScores,
    pub total_marks: i32,
}

/// Applies `patch` to `existing` and recomputes the total when any sub-score
/// was supplied. Returns `None` when the patch leaves the scores untouched.
pub fn rescore(
    existing: &SubScores,
    patch: &SubScoresPatch,
) -> Result<Option<Rescored>, ValidationError> {
    if !patch.touches_any() {
        return Ok(None);
    }
    let scores = existing.apply(patch);
    scores.validate()?;
    Ok(Some(Rescored {
        scores,
        total_marks: scores.total(),
    }))
}
