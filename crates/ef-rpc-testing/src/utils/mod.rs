pub mod diff;
pub(crate) mod io;
