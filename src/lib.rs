pub mod aggregate;
pub mod cli;
pub mod config;
pub mod contributors;
pub mod error;
pub mod export;
pub mod fetch;
pub mod github;
pub mod languages;
pub mod model;
pub mod repos;
pub mod report;
