pub mod export;
pub mod import;

pub use export::{export_csv, export_headers, single_export_file_name, ALL_EXPORT_FILE_NAME};
pub use import::{parse_import, split_csv_line, ImportRow};
