//! BioPrint Academy Server - SpacetimeDB Module
//!
//! Learner accounts, progress, badges and the content catalog stored as
//! SpacetimeDB tables. Every rule (estimator, xp awards, badge conditions)
//! is delegated to bioprint-logic; clients subscribe to the public tables.

mod reducers;
mod tables;

pub use reducers::*;
pub use tables::*;
