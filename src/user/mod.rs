//! User value object and its XML form.

pub mod convert;
pub mod model;

pub use convert::UserMicroTypeConverter;
pub use model::{User, UserBuilder};
