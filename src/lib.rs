//! Regmatrix - classification and comparison of regression-result tables
//!
//! Exported regression tables carry no metadata beyond variable names and
//! formatted cell text. This library infers each table's specification,
//! outcome, UI-size measure and per-column age-control configuration, selects
//! the columns a filter request asks for, and assembles them into a
//! canonically ordered comparison matrix with significance coloring.

pub mod canonical;
pub mod catalog;
pub mod category;
pub mod classify;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod filter;
pub mod json_output;
pub mod matrix;
pub mod select;
pub mod table;
pub mod text_output;
