//! Engine module: CLI surface and run helpers.

pub mod arg_parser;
pub mod handlers;
pub mod tools;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use handlers::handle_run;
pub use tools::is_under_excluded;
