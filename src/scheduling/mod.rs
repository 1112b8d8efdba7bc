pub mod lifecycle;
pub mod proximity;
pub mod slots;
pub mod store;

pub use lifecycle::Scheduler;
