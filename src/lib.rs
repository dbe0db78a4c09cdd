//! Content resolution for a game server.
//!
//! [`gs_parser`] reads the `[Section]` / `key=value` documents the game data is written in.
//! [`gs_content`] indexes a content root, resolves logical names to indexed files and
//! builds the derived objects (unit stats, spells) the simulation asks for.

pub use gs_content::*;
pub use gs_parser::{self, parse, parse_file};
