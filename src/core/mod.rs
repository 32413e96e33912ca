pub mod config;
pub mod error;
pub mod model;
pub mod persona;
pub mod provider;
pub mod transcript;

#[cfg(test)]
mod tests;
