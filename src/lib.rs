//! Equiscore Library
//!
//! Multi-factor trading scores for securities and a preset-driven screener
//! over their latest metrics.

pub mod application;
pub mod config;
pub mod domain;
pub mod persistence;
