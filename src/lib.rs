//! `milestone-race` - Timed life-stage risk decision game
//!
//! A player picks a life stage, then races through the risk events of that
//! stage and every later one, deciding under a countdown whether they are
//! protected or exposed. Decisions move a 0-100 Life Protection Score;
//! repeated exposure to high-severity risks compounds the damage.
//!
//! The [`engine::RaceEngine`] is a synchronous state machine. The
//! [`runtime::RaceRuntime`] hosts it in a tokio task and drives the
//! countdown.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod lead;
pub mod observability;
pub mod runtime;
pub mod score;
pub mod timer;
