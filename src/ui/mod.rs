/// UI module exports
pub mod about;
pub mod components;
pub mod dom;
