pub mod config;
pub mod coordinate;
pub mod equity;
pub mod error;
pub mod geoprocess;
pub mod input;
pub mod output;
