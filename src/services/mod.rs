pub mod desk;

pub use desk::Desk;
