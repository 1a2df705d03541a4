pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod export;
pub mod form;
pub mod generate;
pub mod planner;
pub mod prompt;
pub mod provider;
pub mod session;
pub mod store;
pub mod transcript;
pub mod ux;
pub mod wire;
