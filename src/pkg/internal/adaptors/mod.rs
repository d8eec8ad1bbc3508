pub mod applications;
pub mod colleges;
pub mod jobs;
