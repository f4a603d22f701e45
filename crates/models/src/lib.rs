pub mod errors;
pub mod db;
pub mod session;

#[cfg(test)]
mod tests;
