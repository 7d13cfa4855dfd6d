//! Frontend module - Tokens, Lexer, declaration boundary detection

pub mod directive;
pub mod finder;
pub mod lexer;
pub mod token;
