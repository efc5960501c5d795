use colored::Colorize;

pub mod config;
pub mod crawl;
pub mod error;
pub mod output;
pub mod seeds;

pub use error::{CoreError, Result};

pub fn print_banner() {
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
    eprintln!(
        "  {} {} {}",
        "PHISHCRAWL".bright_cyan().bold(),
        "labeled feature crawler".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    eprintln!("{}\n", "═".repeat(60).bright_blue().bold());
}
