pub mod files;
pub mod session;
pub mod status;
pub mod terminal;
pub mod watch;

pub use files::*;
pub use status::*;
pub use watch::*;
