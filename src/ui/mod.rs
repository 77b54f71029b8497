pub mod word_bar;
pub mod wrong_words;
