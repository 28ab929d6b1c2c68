pub mod api;
pub mod worldmap;
