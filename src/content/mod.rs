// External question providers

pub mod opentdb;

pub use opentdb::TriviaClient;
