pub mod context;
pub mod error;

pub use context::{AppContext, RunFlags};
pub use error::{AppError, Result};
