#[macro_use]
extern crate log;

pub mod config;
mod memory;
mod operations;
mod processor;
mod registers;

pub use {memory::*, processor::*, registers::*};
