pub mod cli;
pub mod config;
pub mod correct;
pub mod crawl;
pub mod data;
pub mod fuzzy;
pub mod generator;
pub mod logging;
pub mod portal;
