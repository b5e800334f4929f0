//! Output handling (render worker, tables, colors)

pub mod printer;
pub mod table;
pub mod terminal;

pub use printer::{Capture, Destination, Printer, RenderJob, Tone};
pub use table::format_table;
