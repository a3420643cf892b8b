//! GNV adoption survey dashboard: loads the survey once, filters it per
//! column, and shows metrics, insights, charts and a CSV export of the subset.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;
