//! Applicant pipeline status and evaluator verdicts.
//!
//! The status machine is permissive: any status may move to any other one.
//! The only rule is membership in the four canonical values.

use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::utils::time::next_modified_at;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicantStatus {
    Selected,
    NotSelected,
    FutureSelect,
    #[default]
    Pending,
}

impl ApplicantStatus {
    pub const ALL: [ApplicantStatus; 4] = [
        ApplicantStatus::Selected,
        ApplicantStatus::NotSelected,
        ApplicantStatus::FutureSelect,
        ApplicantStatus::Pending,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicantStatus::Selected => "selected",
            ApplicantStatus::NotSelected => "not-selected",
            ApplicantStatus::FutureSelect => "future-select",
            ApplicantStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for ApplicantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicantStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| ValidationError::UnknownStatus(value.to_string()))
    }
}

/// Result of applying a status update to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: ApplicantStatus,
    pub to: ApplicantStatus,
    pub updated_at: NaiveDateTime,
}

impl StatusChange {
    /// Re-setting the current status still touches `updated_at` but is not a
    /// transition.
    pub fn is_transition(&self) -> bool {
        self.from != self.to
    }
}

pub fn set_status(
    current: ApplicantStatus,
    requested: &str,
    last_modified: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<StatusChange, ValidationError> {
    let to = requested.trim().parse::<ApplicantStatus>()?;
    Ok(StatusChange {
        from: current,
        to,
        updated_at: next_modified_at(last_modified, now),
    })
}

/// Final verdict an interview panel records for an applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallResult {
    #[serde(rename = "MEETS JOB REQUIREMENT")]
    MeetsRequirement,
    #[serde(rename = "DOES NOT MEET JOB REQUIREMENT")]
    DoesNotMeetRequirement,
    #[serde(rename = "OVER QUALIFIED FOR THE JOB")]
    OverQualified,
    #[serde(rename = "SUITABLE FOR ANOTHER POSITION")]
    SuitableForAnotherPosition,
}

impl OverallResult {
    const ALL: [OverallResult; 4] = [
        OverallResult::MeetsRequirement,
        OverallResult::DoesNotMeetRequirement,
        OverallResult::OverQualified,
        OverallResult::SuitableForAnotherPosition,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OverallResult::MeetsRequirement => "MEETS JOB REQUIREMENT",
            OverallResult::DoesNotMeetRequirement => "DOES NOT MEET JOB REQUIREMENT",
            OverallResult::OverQualified => "OVER QUALIFIED FOR THE JOB",
            OverallResult::SuitableForAnotherPosition => "SUITABLE FOR ANOTHER POSITION",
        }
    }
}

impl FromStr for OverallResult {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|result| result.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownOverallResult(value.to_string()))
    }
}
