pub mod app;
pub mod history;

pub use app::{DragState, Editor, EmptyResolution};
pub use history::{History, Snapshot};
