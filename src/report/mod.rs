pub mod chart;
pub mod compose;
pub mod document;
pub mod exec;
pub mod html;
pub mod sink;

pub use chart::Chart;
pub use compose::{dashboard, language_plots, repository_table, DashboardInput};
pub use document::{Block, Document, Page};
pub use exec::exec;
pub use html::render_html;
pub use sink::{open_in_viewer, save, ReportHost, UploadMeta};
