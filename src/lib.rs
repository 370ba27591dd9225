pub mod config;
pub mod engine;
pub mod initiative;
pub mod input;
pub mod output;
pub mod portfolio_file;
pub mod report;
pub mod settings;
