pub mod compiler;
pub mod diff;
pub mod error;
pub mod ops;
pub mod preview;
pub mod profile;
pub mod render;
pub mod timeline;

pub use compiler::*;
pub use error::{TimelineError, TimelineResult};
pub use timeline::*;
