pub mod catalog;

pub use catalog::Translator;
