//! Record abstraction the table stores.

/// A uniquely keyed value. The table interprets nothing but the key.
///
/// The key must not change while the record is stored; the table places a
/// record by its key at insert time and never re-reads it except to compare
/// or to relocate during a rehash.
pub trait Record: Clone + Send {
    fn key(&self) -> &str;
}

/// Text line encoding used by [`crate::persist::DataStore`].
pub trait LineCodec: Sized {
    fn encode(&self) -> String;
    fn decode(line: &str) -> Result<Self, crate::error::ParseError>;
}

/// CSV export row.
pub trait CsvRow {
    fn csv_header() -> &'static str;
    fn csv_row(&self) -> String;
}
