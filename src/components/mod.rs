pub mod history;
pub mod processor;
pub mod selection;
