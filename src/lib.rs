pub mod error;
pub mod flags;

pub mod core;
pub mod process;
pub mod repl;
pub mod server;
