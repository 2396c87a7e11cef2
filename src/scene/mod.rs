pub(crate) mod lifecycle;
pub(crate) mod navigator;
pub(crate) mod registry;
