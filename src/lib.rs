pub mod api;
pub mod config;
pub mod imaging;
pub mod observability;
pub mod pipeline;
pub mod storage;

#[cfg(test)]
mod test_helpers;
