//! Output formatting for probe results

pub mod console;
pub mod formatter;
