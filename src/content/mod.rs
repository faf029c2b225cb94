pub mod walker;

pub use walker::{ContentSource, MARKER_FILE, WalkError, discover};
