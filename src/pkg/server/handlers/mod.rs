pub mod applications;
pub mod auth;
pub mod colleges;
pub mod jobs;
pub mod probes;
pub mod stats;
