pub mod cache;
pub mod listing_source;
