pub mod dir_reader;
pub mod filter;
pub mod path;
