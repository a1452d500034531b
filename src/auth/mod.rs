//! Auth session: tokens and profile for the signed-in user.

pub mod session;
pub mod storage;

pub use session::{AuthSession, User};
pub use storage::{MemorySessionStorage, SessionStorage};
