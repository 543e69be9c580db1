pub mod profiler;

pub use profiler::{BatchReport, CsvExport, Profiler};
