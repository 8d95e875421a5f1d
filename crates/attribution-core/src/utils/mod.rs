//! Utility functions for labels and markup handling.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{
    corp_total_label, decode_entities, strip_html, student_total_label, truncate_string,
};
