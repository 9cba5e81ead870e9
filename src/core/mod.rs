pub mod change;
pub mod error;

pub use change::{Change, Locked, Success};
pub use error::{DaoError, Result, ensure_not_empty};
