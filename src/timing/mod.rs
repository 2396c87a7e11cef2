pub(crate) mod bus;
pub(crate) mod driver;
pub(crate) mod timers;
