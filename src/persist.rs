//! Bulk load and save of a table through its public API.
//!
//! Data file layout: a header line with the record count, then one
//! [`LineCodec`]-encoded record per line. Loading stops at end of file or at
//! the first empty line. Before every save the previous data file is copied
//! to `<data>.bak`.

use crate::error::{LoadIssue, PersistError};
use crate::record::{CsvRow, LineCodec, Record};
use crate::table::Table;
use crate::validate::Validator;
use core::hash::BuildHasher;
use log::{info, warn};
use parking_lot::Mutex;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Outcome of a bulk load. Skipped records never abort the load.
#[derive(Debug, Default, PartialEq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Records whose key was already present; skipped.
    pub duplicates: usize,
    /// 1-based line number and reason for each record that was skipped.
    pub issues: Vec<(usize, LoadIssue)>,
}

impl LoadReport {
    pub fn skipped(&self) -> usize {
        self.duplicates + self.issues.len()
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> PersistError + '_ {
    move |source| PersistError::Io {
        path: path.display().to_string(),
        source,
    }
}

pub struct DataStore {
    data_path: PathBuf,
    backup_path: PathBuf,
    // Serializes file access through this store.
    file_lock: Mutex<()>,
}

impl DataStore {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        let data_path = data_path.into();
        let mut backup: OsString = data_path.clone().into_os_string();
        backup.push(".bak");
        Self {
            data_path,
            backup_path: PathBuf::from(backup),
            file_lock: Mutex::new(()),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Write a snapshot of `table`. Returns the number of records written.
    pub fn save<R, V, S>(&self, table: &Table<R, V, S>) -> Result<usize, PersistError>
    where
        R: Record + LineCodec,
        V: Validator<R>,
        S: BuildHasher + Clone,
    {
        let _g = self.file_lock.lock();

        if self.data_path.exists() {
            fs::copy(&self.data_path, &self.backup_path).map_err(io_err(&self.backup_path))?;
        }

        let records = table.get_all();
        let file = File::create(&self.data_path).map_err(io_err(&self.data_path))?;
        let mut w = BufWriter::new(file);
        writeln!(w, "{}", records.len()).map_err(io_err(&self.data_path))?;
        for r in &records {
            writeln!(w, "{}", r.encode()).map_err(io_err(&self.data_path))?;
        }
        w.flush().map_err(io_err(&self.data_path))?;

        info!("saved {} records to {}", records.len(), self.data_path.display());
        Ok(records.len())
    }

    /// Insert every record of the data file into `table`.
    ///
    /// A missing data file is a first run, not an error. Undecodable or
    /// invalid records and duplicate keys are skipped and reported.
    pub fn load<R, V, S>(&self, table: &Table<R, V, S>) -> Result<LoadReport, PersistError>
    where
        R: Record + LineCodec,
        V: Validator<R>,
        S: BuildHasher + Clone,
    {
        let _g = self.file_lock.lock();
        let path = self.data_path.as_path();

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("data file {} not found, starting empty", path.display());
                return Ok(LoadReport::default());
            }
            Err(e) => return Err(io_err(path)(e)),
        };

        let mut lines = BufReader::new(file).lines();
        let header = match lines.next() {
            Some(line) => line.map_err(io_err(path))?,
            None => return Ok(LoadReport::default()),
        };
        let announced: usize = header.trim().parse().map_err(|_| PersistError::Header {
            path: path.display().to_string(),
            line: header.clone(),
        })?;

        let mut report = LoadReport::default();
        for (i, line) in lines.enumerate() {
            let line = line.map_err(io_err(path))?;
            if line.is_empty() {
                break;
            }
            let line_no = i + 2;
            let issue: LoadIssue = match R::decode(&line) {
                Err(e) => e.into(),
                Ok(record) => match table.insert(record) {
                    Ok(true) => {
                        report.loaded += 1;
                        continue;
                    }
                    Ok(false) => {
                        report.duplicates += 1;
                        continue;
                    }
                    Err(e) => e.into(),
                },
            };
            warn!("failed to load record at {}:{}: {}", path.display(), line_no, issue);
            report.issues.push((line_no, issue));
        }

        let read = report.loaded + report.skipped();
        if read != announced {
            warn!(
                "{} announces {} records but {} were read",
                path.display(),
                announced,
                read
            );
        }
        info!("loaded {} records from {}", report.loaded, path.display());
        Ok(report)
    }

    /// Load the data file into a fresh table and swap it in as one step.
    /// On error `table` is left untouched.
    pub fn reload<R, V, S>(&self, table: &Table<R, V, S>) -> Result<LoadReport, PersistError>
    where
        R: Record + LineCodec,
        V: Validator<R> + Clone,
        S: BuildHasher + Clone,
    {
        let staging = table.empty_like();
        let report = self.load(&staging)?;
        table.replace_from(&staging);
        Ok(report)
    }

    /// Save a snapshot of `table` to `dir/backup_YYYYMMDD_HHMMSS.dat`.
    pub fn backup_to<R, V, S>(
        table: &Table<R, V, S>,
        dir: impl AsRef<Path>,
    ) -> Result<(PathBuf, usize), PersistError>
    where
        R: Record + LineCodec,
        V: Validator<R>,
        S: BuildHasher + Clone,
    {
        let name = chrono::Local::now()
            .format("backup_%Y%m%d_%H%M%S.dat")
            .to_string();
        let path = dir.as_ref().join(name);
        let written = DataStore::new(&path).save(table)?;
        Ok((path, written))
    }

    /// Write `table` as CSV to `path`. Returns the number of rows written.
    pub fn export_csv<R, V, S>(
        table: &Table<R, V, S>,
        path: impl AsRef<Path>,
    ) -> Result<usize, PersistError>
    where
        R: Record + CsvRow,
        V: Validator<R>,
        S: BuildHasher + Clone,
    {
        let path = path.as_ref();
        let records = table.get_all();
        let file = File::create(path).map_err(io_err(path))?;
        let mut w = BufWriter::new(file);
        writeln!(w, "{}", R::csv_header()).map_err(io_err(path))?;
        for r in &records {
            writeln!(w, "{}", r.csv_row()).map_err(io_err(path))?;
        }
        w.flush().map_err(io_err(path))?;
        info!("exported {} records to CSV: {}", records.len(), path.display());
        Ok(records.len())
    }
}
