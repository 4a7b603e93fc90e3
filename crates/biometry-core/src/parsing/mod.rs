pub mod header;
pub mod lens;
pub mod mmt;
pub mod values;

pub use header::extract_key_values;
pub use lens::extract_lens;
pub use mmt::extract_measurements;
