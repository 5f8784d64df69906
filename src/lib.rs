//! Workload timeline: per-day hour allocation for projects, milestone
//! budgeting on top of a weekly work-hours calendar, and the pixel geometry
//! and drag preview used to draw it.

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod timeline;
