pub mod category;
pub mod form;
pub mod item;
pub mod state;
pub mod time;
pub mod view;
