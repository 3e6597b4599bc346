// src/data_analysis/mod.rs

pub mod axis_calibration;
pub mod display_range;

// src/data_analysis/mod.rs
