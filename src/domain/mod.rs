pub mod entities;
pub mod lifecycle;
