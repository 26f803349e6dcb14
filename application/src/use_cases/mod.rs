//! Use cases: the operations the outside world asks this system to do.

pub mod direct;
pub mod run_council;
pub mod title;
pub mod validate_models;
