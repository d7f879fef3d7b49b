pub mod formatter;

pub use formatter::{
    format_age, format_egress_entries, format_egress_summary, format_percentage, format_report,
    format_results_list, format_score, should_use_colors,
};
