//! Parse kayak and pyxis benchmark logs and plot throughput against p99
//! slowdown for one experiment run.

pub mod env;
pub mod experiments;
