//! Random-access reading of files on disk.

mod data_reader_file;
pub use data_reader_file::*;
