pub mod craft;
pub mod selection;
