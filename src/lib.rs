pub mod applicant;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod models;
pub mod report;
pub mod routes;
pub mod s3;
pub mod schema;
pub mod scoring;
pub mod state;
pub mod status;
pub mod storage;
pub mod utils;
