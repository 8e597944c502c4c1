pub mod choices;
pub mod lane;
pub mod menu;
pub mod modal;
pub mod progress_bar;
pub mod ranking_table;
pub mod round_header;
