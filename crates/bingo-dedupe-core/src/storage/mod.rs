pub mod json_records;

pub use json_records::RecordStore;
