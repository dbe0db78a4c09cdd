mod content_file;
mod errors;
mod parser;

pub use content_file::*;
pub use errors::*;
pub use parser::*;
