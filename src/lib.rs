pub mod aggregate;
pub mod chart;
pub mod config;
pub mod driver;
pub mod loader;
pub mod plots;
pub mod records;
pub mod report;
pub mod runtime;
pub mod theme;

pub use chart::{Chart, Renderer};
pub use config::{ImageFormat, OutputTarget, ReportConfig};
