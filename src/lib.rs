// src/lib.rs
pub mod config;
pub mod data;
pub mod health;
pub mod metrics;
pub mod server;

#[cfg(test)]
mod test_utils;
