pub(crate) mod arena;
pub(crate) mod context;
pub(crate) mod decorator;
pub(crate) mod geometry;
pub(crate) mod model;
