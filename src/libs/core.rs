pub mod feed;
pub mod matching;
pub mod models;
