//! gridcalc - Terminal Mini-Spreadsheet Library
//!
//! A terminal spreadsheet built around a safe formula engine: cell text is
//! parsed into a typed expression tree and evaluated against a fixed function
//! table, never handed to a general-purpose interpreter.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::*;
pub use domain::*;
