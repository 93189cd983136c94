//! Client-side pieces of the Job Portal.
//!
//! This crate provides:
//! - `JobBoardClient`, a typed wrapper over the HTTP API
//! - `JobBrowser` list state with search, type filter and paging
//! - `JobEditor` create/edit form state gated on a signed-in company
//! - `UiUser` header display data

pub mod browser;
pub mod client;
pub mod editor;
pub mod error;
pub mod user;

pub use browser::JobBrowser;
pub use client::JobBoardClient;
pub use editor::{EditorGate, EditorMode, JobEditor, Saved};
pub use error::{ClientError, ClientResult};
pub use user::UiUser;
