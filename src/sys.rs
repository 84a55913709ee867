pub mod host;
pub mod scenario;
pub mod scheduler;
pub mod sim;
