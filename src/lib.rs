pub mod aggregator;
pub mod config;
pub mod controls;
pub mod dashboard;
pub mod fetch;
pub mod filter;
pub mod output;
pub mod parser;
pub mod presentation;
pub mod record;
pub mod series;
pub mod stats;
