pub mod lock;
pub mod user_id;

pub use lock::{LockInfo, LockManager};
pub use user_id::{CurrentUserIdProvider, FixedUserId, SessionUserId};
