pub mod appointments;
pub mod counselors;
