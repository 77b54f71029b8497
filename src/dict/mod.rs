pub mod cache;
pub mod catalog;
pub mod dictionary;
pub mod word;

pub use catalog::{Catalog, DictSource, DictionaryDescriptor};
pub use dictionary::Dictionary;
pub use word::Word;
