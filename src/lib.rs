pub mod cli;
pub mod config;
pub mod dart;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod summary;
