pub mod guides;
pub mod tools;
