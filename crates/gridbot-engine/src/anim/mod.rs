pub mod easing;
pub mod transition;
