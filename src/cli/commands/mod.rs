pub mod catalog;
pub mod config;
pub mod generate;
pub mod refine;
