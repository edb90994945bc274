//! Command-line front end over the content store.
mod app;
mod args;

pub use app::*;
pub use args::*;
