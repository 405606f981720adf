pub mod authors;
pub mod health;
pub mod members;
pub mod posts;
pub mod records;
