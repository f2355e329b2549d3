pub mod batch;
pub mod classifier;
pub mod episode;
pub mod matcher;
pub mod parser;
pub mod scanner;
pub mod search;
pub mod service;
pub mod tags;
