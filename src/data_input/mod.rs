// src/data_input/mod.rs

pub mod loader;
pub mod survey_record;

// src/data_input/mod.rs
