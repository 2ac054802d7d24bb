//! Rendering snapshots for the terminal.

pub mod generator;

pub use generator::{render_json, render_text, ReportOptions};
