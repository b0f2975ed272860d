//! Component change reporting and daily activity statistics for screen
//! maintenance operations.
//!
//! Inspection reports come in through [`source::ReportSource`], get
//! classified per checklist component and are shaped into summaries,
//! detailed records and per-screen histories. Daily activity buckets entity
//! creation counts from [`source::DailyCountSource`].

pub mod activity;
pub mod aggregate;
pub mod checklist;
pub mod config;
pub mod db;
pub mod detection;
pub mod error;
pub mod models;
pub mod render;
pub mod reporting;
pub mod source;

pub use error::{ReportingError, Result};
