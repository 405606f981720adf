pub mod authors;
pub mod lynx;
pub mod members;
pub mod posts;
pub mod records;

#[cfg(test)]
pub(crate) mod testing;
