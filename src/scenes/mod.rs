pub(crate) mod bouncing;
pub(crate) mod hex_grid;
pub mod palette;
