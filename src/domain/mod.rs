pub mod draw;
pub mod record;

pub use draw::*;
pub use record::*;
