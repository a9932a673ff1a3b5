pub mod check;
pub mod component;
pub mod config;
pub mod parser;
pub mod version;
