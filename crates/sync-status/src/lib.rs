//! Status Data Model
//!
//! Core types shared by the monitor pipeline: raw status categories, the
//! policy partition (healthy / transient / incident), per-tick samples, and
//! the debounced confirmed state.

mod category;
mod report;
mod sample;

pub use category::{ParseCategoryError, StatusCategory, StatusClass};
pub use report::StatusReport;
pub use sample::{ConfirmedState, StatusSample};
