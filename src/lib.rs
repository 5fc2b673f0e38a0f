//! Declare row-shaped entities once and map them to parameterized SQL for several dialects.
//!
//! ```rust,ignore
//! use keel::{Entity, Snapshot, crud};
//!
//! #[derive(Entity, Default)]
//! #[keel(table = "users", partial_update, find_by = "email")]
//! struct User {
//!     #[keel(primary)]
//!     id: i64,
//!     name: String,
//!     email: String,
//!     #[keel(sensitive)]
//!     password: String,
//!     #[keel(snapshot)]
//!     snapshot: Snapshot,
//! }
//!
//! let mut user: User = crud::find_one_by(&mut executor, &["email"], vec!["a@b.c".into()]).await?;
//! user.name = "John".into();
//! crud::update(&mut executor, &mut user, true).await?;
//! ```
pub mod crud;

pub use ::keel_core::*;
pub use ::keel_macros::*;
