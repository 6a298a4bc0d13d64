#![allow(non_upper_case_globals)]

#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod io;
pub mod results;
pub mod display;
pub mod dictionary;
pub mod app;
