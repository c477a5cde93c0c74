//! The standard library, written in Lispy itself and compiled into the crate.

pub const SOURCE: &str = include_str!("prelude.lispy");
