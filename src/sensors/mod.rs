pub mod service;

pub use service::{ReadingInput, SensorService};
