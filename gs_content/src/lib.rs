pub mod cache;
pub mod config;
pub mod data;
mod errors;
pub mod index;
pub mod manager;
pub mod map_config;
pub mod nav_grid;
pub mod package;
pub mod relative_path;
pub mod resolver;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cache::*;
pub use config::*;
pub use data::*;
pub use errors::*;
pub use index::*;
pub use manager::*;
pub use map_config::*;
pub use nav_grid::*;
pub use package::*;
pub use relative_path::*;
pub use resolver::*;

pub use gs_parser::{ContentFile, ParseError, Section};
