pub mod authn;
pub mod config;
pub mod directory;
pub mod logs;
pub mod resolver;
pub mod types;
