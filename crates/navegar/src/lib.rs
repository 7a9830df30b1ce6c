//! Browser automation sessions over the Chrome DevTools Protocol.
//!
//! A [`Session`] owns a launched browser and a single [`Page`]. Commands
//! navigate the page once, perform one action, and close the session.
//! With the `browser` feature disabled the same API is backed by a mock
//! that records calls, which keeps the command-layer tests hermetic.
//!
//! # Example
//!
//! ```no_run
//! use navegar::{NavigationPolicy, Session, SessionConfig};
//!
//! # async fn run() -> navegar::Result<()> {
//! let session = Session::launch(SessionConfig::default()).await?;
//! session
//!     .page()
//!     .goto("https://example.com", NavigationPolicy::NetworkIdle)
//!     .await?;
//! let title = session.page().title().await?;
//! println!("{title}");
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod dialog;
pub mod error;
pub mod events;
pub mod keys;
pub mod nav;
pub mod session;

pub use dialog::{DialogAction, DialogKind, DialogRecord};
pub use error::{NavegarError, Result};
pub use events::{
    CaptureHandle, CaptureLog, ConsoleLocation, ConsoleMessageRecord, NetworkRequestRecord,
};
pub use keys::KeyInput;
pub use nav::NavigationPolicy;
pub use session::{Page, Session, SessionConfig};
