//! wineditionctl - command-line front end for winedition.

pub mod cli;
pub mod commands;
pub mod errors;
pub mod logging;
pub mod output;
