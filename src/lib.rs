#![allow(nonstandard_style)]

pub mod builtins;
pub mod classifying;
pub mod config;
pub mod converting;
pub mod error_handling;
pub mod evaluating;
pub mod exchanging;
pub mod inverting;
pub mod parsing;
pub mod plotting;
pub mod scanning;
pub mod symbols;

pub use classifying::{Reply, Session};
pub use error_handling::{CalcError, EvalError, Result};
