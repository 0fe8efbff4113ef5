//! egui widgets; every function reads from [`crate::state::AppState`] and
//! never computes aggregates itself.

pub mod charts;
pub mod metrics;
pub mod panels;
pub mod table;
