pub mod cards;
pub mod chart;
pub mod guard;
pub mod nav;
pub mod navbar;
pub mod toast;
