pub mod formatter;

pub use formatter::{format_region_detail, format_report, format_score, should_use_colors};
