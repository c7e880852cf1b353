pub mod codec;
pub mod cost;
pub mod distribution;
pub mod driver;
pub mod engine;
pub mod error;
pub mod merge;
pub mod report;
pub mod rollup;
pub mod summary;

pub use cost::CostFunction;
pub use distribution::{Bucket, Distribution, LinearBucketer};
pub use driver::{PartialResults, Segment, Simulation, SimulationResults, partition};
pub use engine::{schedule, totals_for_network};
pub use error::{DriverError, ReportError};
pub use merge::merge_reports;
pub use report::{AnalysisReport, ReportBuilder, ReportFormat};
pub use rollup::{CategorySeries, category_rollup};
pub use summary::cost_summary;
