//! Command implementations.

pub mod compute;
pub mod params;
pub mod profile;
pub mod results;
pub mod submit;
pub mod summary;

pub use self::compute::execute_compute;
pub use self::params::execute_params;
pub use self::profile::execute_profile;
pub use self::results::execute_results;
pub use self::submit::execute_submit;
pub use self::summary::execute_summary;
