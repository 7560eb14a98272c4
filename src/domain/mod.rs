pub mod aggregation;
pub mod amenities;
pub mod boundary;
pub mod date_axis;
pub mod listing;
pub mod selection;
