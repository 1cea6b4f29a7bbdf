//! # Events Module
//!
//! Progress reporting decoupled from presentation.
//!
//! The core stages emit events through a channel; the CLI listens on a
//! separate thread and renders progress bars. Library users that don't care
//! pass [`null_sender`].
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Group(GroupEvent::Progress(p)) = event {
//!             println!("{:.1}%", p.percent());
//!         }
//!     }
//! });
//!
//! let pipeline = Pipeline::builder().events(sender).build();
//! pipeline.find_duplicates(&root)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub(crate) use channel::ProgressTicker;
pub use types::*;
