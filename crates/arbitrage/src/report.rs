//! Per-round order book report
//!
//! One row per aggregation round with `bid, ask, spread %` for every venue in
//! the fixed venue order. Venues without data leave their cells empty.

use bitbot_exchanges::OrderBook;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Column headers, three per venue
pub fn report_headers<S: AsRef<str>>(venues: &[S]) -> Vec<String> {
    venues
        .iter()
        .flat_map(|venue| [format!("{} bid", venue.as_ref()), "ask".to_string(), "spread %".to_string()])
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    cells: Vec<String>,
}

impl ReportRow {
    pub fn from_books(books: &[Option<OrderBook>]) -> Self {
        let mut cells = Vec::with_capacity(books.len() * 3);
        for book in books {
            let bid = book.as_ref().and_then(|b| b.best_bid()).map(|l| l.price());
            let ask = book.as_ref().and_then(|b| b.best_ask()).map(|l| l.price());
            let spread = book.as_ref().and_then(|b| b.spread_percent());

            for value in [bid, ask, spread] {
                cells.push(value.map(|v| v.to_string_with_scale(2)).unwrap_or_default());
            }
        }
        Self { cells }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// Writes the header on creation, then one flushed row per round
pub struct CsvReportSink<W: io::Write> {
    writer: csv::Writer<W>,
}

impl<W: io::Write> CsvReportSink<W> {
    pub fn new<S: AsRef<str>>(inner: W, venues: &[S]) -> Result<Self, ReportError> {
        let mut writer = csv::WriterBuilder::new().flexible(false).from_writer(inner);
        writer.write_record(report_headers(venues))?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn write_row(&mut self, row: &ReportRow) -> Result<(), ReportError> {
        self.writer.write_record(row.cells())?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, ReportError> {
        self.writer
            .into_inner()
            .map_err(|e| ReportError::Io(e.into_error()))
    }
}
