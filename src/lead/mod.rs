//! Lead capture.
//!
//! The engine never submits leads itself. A shell collects a [`LeadForm`]
//! while the engine sits in `LeadForm`, builds a [`LeadSubmission`] from
//! the snapshot, delivers it through a [`LeadSubmitter`], and only then
//! fires `submission_succeeded`. A failed delivery leaves the session
//! untouched so the player can retry.

pub mod form;
pub mod submit;

pub use form::{DEFAULT_TIME_SLOTS, LeadForm, default_time_slots};
pub use submit::{
    DEFAULT_TIMEOUT, HttpLeadSubmitter, LEAD_SOURCE, LeadSubmission, LeadSubmitter,
};
