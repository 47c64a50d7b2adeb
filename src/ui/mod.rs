pub mod bottom_bar;
pub mod inspector;
pub mod selector;
pub mod top;
pub mod util;
