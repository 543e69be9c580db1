//! Company intelligence: prompts, response parsing, and CSR news.

pub mod news;
pub mod parse;
pub mod prompts;

pub use news::*;
pub use parse::*;
pub use prompts::*;
