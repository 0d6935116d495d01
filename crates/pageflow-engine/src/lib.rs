pub mod editing;
pub mod history;
pub mod io;
pub mod layout;
pub mod models;
pub mod parsing;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{cursor::*, debounce::*, session::*, sync::*};
pub use history::*;
pub use io::*;
pub use layout::*;
pub use models::*;
