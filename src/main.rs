//! `glr` — a Generalized LR (GLR) parsing engine CLI driver.
//!
//! # Author
//! Juan Manuel Young Hoyos

use clap::Parser as ClapParser;
use std::process;

fn main() {
    env_logger::init();
    let cli = glr_engine::cli::Cli::parse();
    process::exit(glr_engine::cli::run(cli));
}
