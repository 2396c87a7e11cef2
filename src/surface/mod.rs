pub(crate) mod display_list;
pub(crate) mod graphic;
