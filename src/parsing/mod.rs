//! Readers and writers for the files the command-line tool works with.
//!
//! This module provides:
//!
//! - **Entity records**: JSON lines or a JSON array of polymer entity documents
//! - **Compression**: transparent gzip/bgzip decoding by file extension
//!
//! The match index and SIFTS summary loaders live with their providers in
//! [`crate::catalog`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use refseq_assign::parsing::records::{read_records, RecordWriter};
//! use std::path::Path;
//!
//! let mut writer = RecordWriter::create(Path::new("out.jsonl")).unwrap();
//! for item in read_records(Path::new("entities.jsonl.gz")).unwrap() {
//!     let item = item.unwrap();
//!     match &item.record {
//!         Ok(record) => writer.write_record(record).unwrap(),
//!         Err(_) => writer.write_raw(&item.raw).unwrap(),
//!     }
//! }
//! writer.finish().unwrap();
//! ```

pub mod compression;
pub mod records;
