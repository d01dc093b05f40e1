//! CLI Command Implementations

pub mod generate;
