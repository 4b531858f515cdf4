pub mod assignment_engine;
pub mod config;
pub mod error;
pub mod intake;
pub mod model;
pub mod rng;
pub mod service;
pub mod store;
pub mod types;
