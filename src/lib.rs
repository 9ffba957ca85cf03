pub mod assembler;
pub mod clipboard;
pub mod config;
pub mod filter;
pub mod format;
pub mod history;
pub mod loader;
pub mod scanner;
pub mod session;
pub mod source;
pub mod store;
