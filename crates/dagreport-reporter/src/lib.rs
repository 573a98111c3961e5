pub mod link;
pub mod render;
pub mod reporter;
pub mod table;

pub use link::history_url;
pub use render::{render_failure_digest, render_html, render_step_table, render_summary};
pub use reporter::{Reporter, RunError};
pub use table::TextTable;
