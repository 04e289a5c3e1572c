pub mod bar_chart;
pub mod controls;
pub mod debug;
pub mod farmer_table;
pub mod metrics;
pub mod path_input;
pub mod pie;
pub mod radio_block;
pub mod selector;
