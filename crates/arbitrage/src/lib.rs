//! # Bitbot Arbitrage
//!
//! One aggregation round fetches a pair from every venue concurrently, scans
//! the books for cross-venue opportunities and reports the top of each book.

pub mod aggregator;
pub mod detector;
pub mod report;

pub use aggregator::{AggregatorConfig, OrderBookAggregator};
pub use detector::{ArbitrageDetector, OpportunityFilter, OpportunityReport, detect_opportunity};
pub use report::{CsvReportSink, ReportError, ReportRow, report_headers};
