pub mod gviz;
pub mod rows;

pub use gviz::{IngestError, SheetClient, decode_table};
pub use rows::{Cell, RawRow, map_rows};
