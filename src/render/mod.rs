pub mod context;
pub mod dashboard;
pub mod layout;
pub mod overlays;
