pub mod preset;

pub use preset::SavedContext;
