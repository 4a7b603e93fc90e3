pub mod json;
pub mod summary;
pub mod xlsx;
