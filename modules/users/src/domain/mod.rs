pub mod error;
pub mod events;
pub mod password;
pub mod ports;
pub mod repo;
pub mod service;
