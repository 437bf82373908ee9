pub mod app;
pub mod cli;
pub mod config;
pub mod coords;
pub mod filter;
pub mod output;
pub mod paginate;
pub mod posko;
pub mod records;
pub mod runner;
pub mod sheets;
pub mod utils;

#[cfg(test)]
mod tests;
