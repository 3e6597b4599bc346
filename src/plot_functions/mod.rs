// src/plot_functions/mod.rs

pub mod plot_power;
pub mod plot_radargram;
pub mod plot_traces;

// src/plot_functions/mod.rs
