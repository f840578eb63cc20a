pub mod axis_gauge;
pub mod button_gauge;
pub mod trigger_gauge;
