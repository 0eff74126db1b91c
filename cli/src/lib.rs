//! Semsearch command-line front end
//!
//! Wires configuration, the fastembed model and [`semsearch_core::Session`]
//! into one-shot commands and an interactive prompt.

pub mod app;
pub mod args;
pub mod interactive;
pub mod render;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{exit_code, run};
pub use args::{Args, Command};
pub use interactive::Repl;
