pub mod backends;
pub mod chains;
pub mod config;
pub mod extract;

pub use backends::*;
pub use chains::*;
pub use config::*;
pub use extract::*;
