pub mod cursor;
pub mod input;
pub mod mode;
pub mod trainer;
