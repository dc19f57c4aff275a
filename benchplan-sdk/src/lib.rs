pub const PROJECT_NAME: &str = "benchplan";

pub mod chunk;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod expand;
pub mod plan;
pub mod prompt;
pub mod resolver;
pub mod session;
pub mod sets;
pub mod staging;
pub mod template;
