//! Educational resource portal library
//!
//! This library holds the course documents, tutorials and projects of every
//! class in a content store, tracks the user's favorites, accepts new
//! publications, and mirrors all of it into a durable key-value store.

mod cli;
mod config;
mod dataset;
mod errors;
mod ids;
mod item;
mod kv;
mod persistence;
mod profile;
mod publish;
mod search;
mod store;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use dataset::*;
pub use errors::*;
pub use ids::*;
pub use item::*;
pub use kv::*;
pub use persistence::*;
pub use profile::*;
pub use publish::*;
pub use search::*;
pub use store::*;
pub use types::*;
