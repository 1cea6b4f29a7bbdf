//! # Reporter Module
//!
//! Renders the duplicate log as a standalone HTML page so the user can see
//! what will be kept and what will go before running a real deletion.
//!
//! Each group shows its members with thumbnails loaded straight from disk
//! through `file://` URLs, the resolution and capture time that drove the
//! ranking, and a Keep/Delete badge once the group is resolved.

mod export;
mod html;

pub use export::{export_html, export_to_file, Verdict};
pub use html::{escape, file_url};
