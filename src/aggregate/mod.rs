pub mod activity;
pub mod languages;

pub use activity::{contributor_totals, flatten_contributor_activity};
pub use languages::{
    language_percentages, language_rank, language_totals, log_bytes, sort_descending,
    top_languages, user_language_percentages,
};
