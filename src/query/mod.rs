//! Filter query parsing and evaluation module
//!
//! This module handles parsing filter strings like
//! "GC/Start::Depth >= 2 && (Reason == AllocSmall || Reason == Induced)"
//! and evaluating them against candidate events.

mod ast;
pub mod cache;
mod evaluator;
pub mod parser;
mod tree;


pub use ast::*;
pub use cache::*;
pub use evaluator::*;
pub use parser::*;
pub use tree::*;
