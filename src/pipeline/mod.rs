pub mod coordinator;
pub mod driver;
