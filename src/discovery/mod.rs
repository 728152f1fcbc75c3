pub mod decoder;
pub mod reader;
pub mod table;
pub mod workers;

#[cfg(test)]
mod tests;

pub use decoder::{Observation, decode_observation};
pub use reader::{Capture, read_capture};
pub use table::HostTable;
pub use workers::{apply_observation, run_workers};
