pub mod constants;
pub mod models;
pub mod normalizer;
pub mod test_utils;
pub mod traits;
pub mod utils;
pub mod validation;
