//! CLI command handlers, one per file.

mod completions;
mod resolve;
mod schemes;

pub use completions::run_completions;
pub use resolve::{run_resolve, ResolveFlags};
pub use schemes::run_schemes;
