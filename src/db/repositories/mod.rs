mod appointment_repository;
mod counselor_repository;

pub use appointment_repository::AppointmentRepository;
pub use counselor_repository::CounselorRepository;
