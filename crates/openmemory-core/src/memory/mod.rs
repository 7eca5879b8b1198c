pub mod base;
pub mod salience;
pub mod sector;

pub use base::Memory;
pub use salience::Salience;
pub use sector::Sector;
