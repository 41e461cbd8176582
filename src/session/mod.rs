pub mod catalog;
pub mod feedback;
pub mod study;
