pub mod civil_time;
pub mod validation;
