//! Session persistence for the CLI.

mod storage;

pub use storage::FileSessionStorage;
