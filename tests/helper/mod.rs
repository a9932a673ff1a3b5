#![allow(dead_code)]

mod target;

pub use target::*;
