pub mod app;
pub mod braille;
pub mod data;
pub mod geo;
pub mod map;
pub mod ui;
