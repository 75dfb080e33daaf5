// Utilities
pub mod error;
pub mod formatter;
pub mod path_guard;

#[cfg(test)]
pub(crate) mod test_fixtures;
