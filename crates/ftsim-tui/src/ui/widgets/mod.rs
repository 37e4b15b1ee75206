//! # ftsim-tui::ui::widgets
//!
//! This module contains the individual widget implementations for the TUI.

pub mod graph;
pub mod logs;
pub mod metrics;
pub mod status;
