//! User interface module - terminal rendering of run results.
//!
//! Progress is logged as it happens; this module prints the end-of-run
//! summary in `formatter`.

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_error, display_report, format_boundary_warning,
    format_directory_line,
};
