//! Pure logic for BioPrint Academy.
//!
//! This crate holds everything that is independent of the database and
//! transport: the outcome estimator, level progression, badge rules,
//! quizzes, catalog records, the record store seam and the REST-style
//! router. The SpacetimeDB module and the headless harness both build on
//! it.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`accounts`] | Users, progress entries, earned badges, profile view |
//! | [`api`] | Transport-agnostic request routing and error mapping |
//! | [`badges`] | Badge metadata and award rules |
//! | [`catalog`] | Topics, tissue items, case studies, challenges, quiz questions, filters |
//! | [`config`] | Award amounts, quiz pass mark, seeding switch |
//! | [`error`] | Shared error types |
//! | [`organs`] | Organ enum and per-organ baseline table |
//! | [`progression`] | Level table, `level_for`, progress ledger |
//! | [`quiz`] | Multiple-choice quiz sessions and scoring |
//! | [`simulation`] | Outcome estimator and recovery timeline |
//! | [`store`] | `Store` trait and in-memory implementation |

pub mod accounts;
pub mod api;
pub mod badges;
pub mod catalog;
pub mod config;
pub mod error;
pub mod organs;
pub mod progression;
pub mod quiz;
pub mod simulation;
pub mod store;

pub use error::{InvalidInput, StoreError};
pub use progression::{level_for, ProgressionState};
pub use simulation::{estimate, SimulationOutput};
