//! Core domain models shared across the auth service, the sync server, and storage.
//!
//! These are the "truth" types — what the database stores and the wire protocol carries.

pub mod app;
pub mod item;
pub mod message;
pub mod user;

pub use app::*;
pub use item::*;
pub use message::*;
pub use user::*;
