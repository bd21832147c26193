//! Typed applicant payloads and their validation into database rows.
//!
//! Request bodies are checked here, before anything touches the store:
//! required name, sub-score ranges, status and verdict membership,
//! interviewer slots and appointment details. `totalMarks` is always
//! derived from the sub-scores and never read from a request.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::models::{Applicant, NewApplicant};
use crate::schema::applicants;
use crate::scoring::{rescore, SubScores, SubScoresPatch};
use crate::status::{set_status, ApplicantStatus, OverallResult, StatusChange};
use crate::utils::json::{non_blank, nullable};
use crate::utils::time::{next_modified_at, to_iso};

pub const MAX_INTERVIEWERS: usize = 3;

// Column widths of the applicants table.
pub const NAME_MAX_LEN: usize = 255;
pub const EMAIL_MAX_LEN: usize = 255;
pub const HOMETOWN_MAX_LEN: usize = 255;
pub const PHONE_MAX_LEN: usize = 50;
pub const NIC_MAX_LEN: usize = 50;
pub const EMPLOYEE_STATUS_MAX_LEN: usize = 100;
pub const NOTICE_PERIOD_MAX_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum ApplicantError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("failed to encode applicant details: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interviewer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub sign: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetails {
    #[serde(default)]
    pub appointment_date: Option<NaiveDate>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub agreed_salary: Option<f64>,
    #[serde(default)]
    pub benefits: Option<String>,
}

/// Keeps filled interviewer slots (those with a name).
pub fn normalize_interviewers(
    slots: Vec<Interviewer>,
) -> Result<Vec<Interviewer>, ValidationError> {
    let filled: Vec<Interviewer> = slots
        .into_iter()
        .filter_map(|slot| {
            let name = non_blank(slot.name)?;
            Some(Interviewer {
                name: Some(name),
                designation: non_blank(slot.designation),
                sign: non_blank(slot.sign),
                date: slot.date,
            })
        })
        .collect();

    if filled.len() > MAX_INTERVIEWERS {
        return Err(ValidationError::TooManyInterviewers {
            max: MAX_INTERVIEWERS,
            got: filled.len(),
        });
    }
    Ok(filled)
}

/// An appointment only exists once a position has been set.
pub fn normalize_appointment(
    details: Option<AppointmentDetails>,
) -> Result<Option<AppointmentDetails>, ValidationError> {
    let Some(details) = details else {
        return Ok(None);
    };
    let Some(position) = non_blank(details.position) else {
        return Ok(None);
    };
    if details.agreed_salary.is_some_and(|salary| salary < 0.0) {
        return Err(ValidationError::Negative("appointmentDetails.agreedSalary"));
    }
    Ok(Some(AppointmentDetails {
        appointment_date: details.appointment_date,
        position: Some(position),
        company_name: non_blank(details.company_name),
        department: non_blank(details.department),
        agreed_salary: details.agreed_salary,
        benefits: non_blank(details.benefits),
    }))
}

fn non_negative_i32(field: &'static str, value: Option<i32>) -> Result<Option<i32>, ValidationError> {
    match value {
        Some(v) if v < 0 => Err(ValidationError::Negative(field)),
        other => Ok(other),
    }
}

fn non_negative_f64(field: &'static str, value: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match value {
        Some(v) if v < 0.0 => Err(ValidationError::Negative(field)),
        other => Ok(other),
    }
}

fn parse_overall_result(value: Option<String>) -> Result<Option<String>, ValidationError> {
    non_blank(value)
        .map(|raw| raw.parse::<OverallResult>().map(|r| r.as_str().to_string()))
        .transpose()
}

/// Trimmed text that must fit its column.
fn bounded(
    field: &'static str,
    max: usize,
    value: Option<String>,
) -> Result<Option<String>, ValidationError> {
    let value = non_blank(value);
    if let Some(text) = value.as_deref() {
        ValidationError::check_length(field, max, text)?;
    }
    Ok(value)
}

fn patch_bounded(
    field: &'static str,
    max: usize,
    value: Option<Option<String>>,
) -> Result<Option<Option<String>>, ValidationError> {
    value.map(|inner| bounded(field, max, inner)).transpose()
}

fn interviewers_json(slots: Vec<Interviewer>) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(slots)
}

fn appointment_json(
    details: Option<AppointmentDetails>,
) -> Result<Option<serde_json::Value>, serde_json::Error> {
    details.map(serde_json::to_value).transpose()
}

/// Who performed a change, as reported by the authentication layer.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicantRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub hometown: Option<String>,
    pub age: Option<i32>,
    pub phone: Option<String>,
    pub nic_number: Option<String>,
    pub employee_status: Option<String>,
    pub family_details: Option<String>,
    pub reason_for_leaving: Option<String>,
    pub experience: Option<String>,
    #[serde(default)]
    pub marks: SubScores,
    pub comments: Option<String>,
    pub notice_period: Option<String>,
    pub present_salary: Option<f64>,
    pub expected_salary: Option<f64>,
    pub possible_start_date: Option<NaiveDate>,
    pub overall_result: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub interviewers: Vec<Interviewer>,
    pub appointment_details: Option<AppointmentDetails>,
}

impl CreateApplicantRequest {
    pub fn into_new_applicant(
        self,
        actor: &Actor,
        now: NaiveDateTime,
    ) -> Result<NewApplicant, ApplicantError> {
        let name = bounded("name", NAME_MAX_LEN, self.name)?
            .ok_or(ValidationError::MissingField("name"))?;
        self.marks.validate()?;
        let status = match non_blank(self.status) {
            Some(raw) => raw.parse::<ApplicantStatus>()?,
            None => ApplicantStatus::default(),
        };

        Ok(NewApplicant {
            id: Uuid::new_v4(),
            name,
            email: bounded("email", EMAIL_MAX_LEN, self.email)?,
            hometown: bounded("hometown", HOMETOWN_MAX_LEN, self.hometown)?,
            age: non_negative_i32("age", self.age)?,
            phone: bounded("phone", PHONE_MAX_LEN, self.phone)?,
            nic_number: bounded("nicNumber", NIC_MAX_LEN, self.nic_number)?,
            employee_status: bounded(
                "employeeStatus",
                EMPLOYEE_STATUS_MAX_LEN,
                self.employee_status,
            )?,
            family_details: non_blank(self.family_details),
            reason_for_leaving: non_blank(self.reason_for_leaving),
            experience: non_blank(self.experience),
            punctuality: self.marks.punctuality,
            preparedness: self.marks.preparedness,
            communication_skills: self.marks.communication_skills,
            experience_required: self.marks.experience_required,
            qualification_required: self.marks.qualification_required,
            total_marks: self.marks.total(),
            comments: non_blank(self.comments),
            notice_period: bounded("noticePeriod", NOTICE_PERIOD_MAX_LEN, self.notice_period)?,
            present_salary: non_negative_f64("presentSalary", self.present_salary)?,
            expected_salary: non_negative_f64("expectedSalary", self.expected_salary)?,
            possible_start_date: self.possible_start_date,
            overall_result: parse_overall_result(self.overall_result)?,
            status: status.as_str().to_string(),
            interviewers: interviewers_json(normalize_interviewers(self.interviewers)?)?,
            appointment: appointment_json(normalize_appointment(self.appointment_details)?)?,
            created_by: Some(actor.id),
            created_by_name: Some(actor.name.clone()),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Full update: omitted fields are kept, `null` clears optional ones.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicantRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub hometown: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub age: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub nic_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub employee_status: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub family_details: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub reason_for_leaving: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub experience: Option<Option<String>>,
    #[serde(default)]
    pub marks: SubScoresPatch,
    #[serde(default, deserialize_with = "nullable")]
    pub comments: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub notice_period: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub present_salary: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub expected_salary: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub possible_start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub overall_result: Option<Option<String>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub interviewers: Option<Option<Vec<Interviewer>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub appointment_details: Option<Option<AppointmentDetails>>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = applicants)]
pub struct ApplicantChangeset {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub hometown: Option<Option<String>>,
    pub age: Option<Option<i32>>,
    pub phone: Option<Option<String>>,
    pub nic_number: Option<Option<String>>,
    pub employee_status: Option<Option<String>>,
    pub family_details: Option<Option<String>>,
    pub reason_for_leaving: Option<Option<String>>,
    pub experience: Option<Option<String>>,
    pub punctuality: Option<Option<i32>>,
    pub preparedness: Option<Option<i32>>,
    pub communication_skills: Option<Option<i32>>,
    pub experience_required: Option<Option<i32>>,
    pub qualification_required: Option<Option<i32>>,
    pub total_marks: Option<i32>,
    pub comments: Option<Option<String>>,
    pub notice_period: Option<Option<String>>,
    pub present_salary: Option<Option<f64>>,
    pub expected_salary: Option<Option<f64>>,
    pub possible_start_date: Option<Option<NaiveDate>>,
    pub overall_result: Option<Option<String>>,
    pub status: Option<String>,
    pub interviewers: Option<serde_json::Value>,
    pub appointment: Option<Option<serde_json::Value>>,
    pub updated_at: Option<NaiveDateTime>,
}

/// A validated update ready to be written.
#[derive(Debug)]
pub struct PreparedUpdate {
    pub changeset: ApplicantChangeset,
    pub status_change: Option<StatusChange>,
}

fn patch_text(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(non_blank)
}

impl UpdateApplicantRequest {
    pub fn prepare(
        self,
        existing: &Applicant,
        now: NaiveDateTime,
    ) -> Result<PreparedUpdate, ApplicantError> {
        let name = match self.name {
            None => None,
            Some(value) => Some(
                bounded("name", NAME_MAX_LEN, value)?
                    .ok_or(ValidationError::MissingField("name"))?,
            ),
        };

        let rescored = rescore(&existing.sub_scores(), &self.marks)?;
        let updated_at = next_modified_at(existing.updated_at, now);

        let status_change = match self.status {
            Some(requested) => Some(set_status(
                current_status(existing),
                &requested,
                existing.updated_at,
                now,
            )?),
            None => None,
        };

        let age = match self.age {
            Some(value) => Some(non_negative_i32("age", value)?),
            None => None,
        };
        let present_salary = match self.present_salary {
            Some(value) => Some(non_negative_f64("presentSalary", value)?),
            None => None,
        };
        let expected_salary = match self.expected_salary {
            Some(value) => Some(non_negative_f64("expectedSalary", value)?),
            None => None,
        };
        let overall_result = match self.overall_result {
            Some(value) => Some(parse_overall_result(value)?),
            None => None,
        };
        let interviewers = match self.interviewers {
            Some(slots) => Some(interviewers_json(normalize_interviewers(
                slots.unwrap_or_default(),
            )?)?),
            None => None,
        };
        let appointment = match self.appointment_details {
            Some(details) => Some(appointment_json(normalize_appointment(details)?)?),
            None => None,
        };

        let mut changeset = ApplicantChangeset {
            name,
            email: patch_bounded("email", EMAIL_MAX_LEN, self.email)?,
            hometown: patch_bounded("hometown", HOMETOWN_MAX_LEN, self.hometown)?,
            age,
            phone: patch_bounded("phone", PHONE_MAX_LEN, self.phone)?,
            nic_number: patch_bounded("nicNumber", NIC_MAX_LEN, self.nic_number)?,
            employee_status: patch_bounded(
                "employeeStatus",
                EMPLOYEE_STATUS_MAX_LEN,
                self.employee_status,
            )?,
            family_details: patch_text(self.family_details),
            reason_for_leaving: patch_text(self.reason_for_leaving),
            experience: patch_text(self.experience),
            comments: patch_text(self.comments),
            notice_period: patch_bounded(
                "noticePeriod",
                NOTICE_PERIOD_MAX_LEN,
                self.notice_period,
            )?,
            present_salary,
            expected_salary,
            possible_start_date: self.possible_start_date,
            overall_result,
            status: status_change.map(|change| change.to.as_str().to_string()),
            interviewers,
            appointment,
            updated_at: Some(updated_at),
            ..Default::default()
        };

        if let Some(rescored) = rescored {
            changeset.punctuality = Some(rescored.scores.punctuality);
            changeset.preparedness = Some(rescored.scores.preparedness);
            changeset.communication_skills = Some(rescored.scores.communication_skills);
            changeset.experience_required = Some(rescored.scores.experience_required);
            changeset.qualification_required = Some(rescored.scores.qualification_required);
            changeset.total_marks = Some(rescored.total_marks);
        }

        Ok(PreparedUpdate {
            changeset,
            status_change,
        })
    }
}

/// Partial update body; only the status may change.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

/// Rows always carry a known status because of the table constraint; fall
/// back to the default if one does not.
pub fn current_status(applicant: &Applicant) -> ApplicantStatus {
    applicant.status.parse().unwrap_or_default()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantResponse {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub hometown: Option<String>,
    pub age: Option<i32>,
    pub phone: Option<String>,
    pub nic_number: Option<String>,
    pub employee_status: Option<String>,
    pub family_details: Option<String>,
    pub reason_for_leaving: Option<String>,
    pub experience: Option<String>,
    pub marks: SubScores,
    pub total_marks: i32,
    pub comments: Option<String>,
    pub notice_period: Option<String>,
    pub present_salary: Option<f64>,
    pub expected_salary: Option<f64>,
    pub possible_start_date: Option<NaiveDate>,
    pub overall_result: Option<String>,
    pub status: String,
    pub interviewers: Vec<Interviewer>,
    pub appointment_details: Option<AppointmentDetails>,
    pub cv_file: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_by_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<Applicant> for ApplicantResponse {
    type Error = serde_json::Error;

    fn try_from(applicant: Applicant) -> Result<Self, Self::Error> {
        let marks = applicant.sub_scores();
        let interviewers: Vec<Interviewer> = serde_json::from_value(applicant.interviewers)?;
        let appointment_details = applicant
            .appointment
            .map(serde_json::from_value::<AppointmentDetails>)
            .transpose()?;

        Ok(Self {
            id: applicant.id,
            name: applicant.name,
            email: applicant.email,
            hometown: applicant.hometown,
            age: applicant.age,
            phone: applicant.phone,
            nic_number: applicant.nic_number,
            employee_status: applicant.employee_status,
            family_details: applicant.family_details,
            reason_for_leaving: applicant.reason_for_leaving,
            experience: applicant.experience,
            marks,
            total_marks: applicant.total_marks,
            comments: applicant.comments,
            notice_period: applicant.notice_period,
            present_salary: applicant.present_salary,
            expected_salary: applicant.expected_salary,
            possible_start_date: applicant.possible_start_date,
            overall_result: applicant.overall_result,
            status: applicant.status,
            interviewers,
            appointment_details,
            cv_file: applicant.cv_file,
            created_by: applicant.created_by,
            created_by_name: applicant.created_by_name,
            created_at: to_iso(applicant.created_at),
            updated_at: to_iso(applicant.updated_at),
        })
    }
}
