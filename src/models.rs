use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::*;
use crate::scoring::SubScores;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = admins)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admins)]
pub struct NewAdmin {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = applicants)]
pub struct Applicant {
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
    pub punctuality: Option<i32>,
    pub preparedness: Option<i32>,
    pub communication_skills: Option<i32>,
    pub experience_required: Option<i32>,
    pub qualification_required: Option<i32>,
    pub total_marks: i32,
    pub comments: Option<String>,
    pub notice_period: Option<String>,
    pub present_salary: Option<f64>,
    pub expected_salary: Option<f64>,
    pub possible_start_date: Option<NaiveDate>,
    pub overall_result: Option<String>,
    pub status: String,
    pub interviewers: serde_json::Value,
    pub appointment: Option<serde_json::Value>,
    pub cv_file: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_by_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Applicant {
    pub fn sub_scores(&self) -> SubScores {
        SubScores {
            punctuality: self.punctuality,
            preparedness: self.preparedness,
            communication_skills: self.communication_skills,
            experience_required: self.experience_required,
            qualification_required: self.qualification_required,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = applicants)]
pub struct NewApplicant {
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
    pub punctuality: Option<i32>,
    pub preparedness: Option<i32>,
    pub communication_skills: Option<i32>,
    pub experience_required: Option<i32>,
    pub qualification_required: Option<i32>,
    pub total_marks: i32,
    pub comments: Option<String>,
    pub notice_period: Option<String>,
    pub present_salary: Option<f64>,
    pub expected_salary: Option<f64>,
    pub possible_start_date: Option<NaiveDate>,
    pub overall_result: Option<String>,
    pub status: String,
    pub interviewers: serde_json::Value,
    pub appointment: Option<serde_json::Value>,
    pub created_by: Option<Uuid>,
    pub created_by_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = status_transitions)]
#[diesel(belongs_to(Applicant))]
pub struct StatusTransition {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub actor_name: String,
    pub from_status: Option<String>,
    pub to_status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = status_transitions)]
pub struct NewStatusTransition {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub actor_name: String,
    pub from_status: Option<String>,
    pub to_status: String,
    pub created_at: NaiveDateTime,
}
