pub mod config;
pub mod list;
pub mod merge;
pub mod preview;
pub mod util;

pub use config::*;
pub use list::*;
pub use merge::*;
pub use preview::*;
pub use util::*;
