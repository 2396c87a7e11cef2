/// Frame type and renderer settings.
pub(crate) mod backend;
/// CPU rasterizer powered by `vello_cpu`.
pub(crate) mod cpu;
