pub mod create_lbs;
pub mod template;
