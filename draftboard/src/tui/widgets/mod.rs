// Widget modules, one per screen zone.

pub mod board;
pub mod detail;
pub mod status_bar;
