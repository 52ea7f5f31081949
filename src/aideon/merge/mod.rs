pub mod batch;
pub mod command;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod repl;
pub mod session;

pub use error::{MergeError, Result};
