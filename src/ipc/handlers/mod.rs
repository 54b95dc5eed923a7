pub mod backup;
pub mod communication;
pub mod core;
pub mod entities;
pub mod fees;
pub mod gradebook;
pub mod session;
pub mod settings;
