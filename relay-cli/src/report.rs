//! Terminal output
//!
//! Progress banners and results go to stdout; diagnostics go through
//! `tracing` to stderr.

use colored::*;
use relay_core::domain::output::OutputBlock;
use relay_core::domain::run::RunHandle;
use relay_core::domain::token::CorrelationToken;

const BANNER_WIDTH: usize = 25;

/// Print the input prompt
pub fn prompt() {
    println!("Type the commands you want to run, press CTRL+D to exit");
    println!();
}

/// Print a section banner
pub fn banner(title: &str) {
    let tail = "#".repeat(BANNER_WIDTH.saturating_sub(title.len()).max(3));
    println!("{}", format!("########### {} {}", title, tail).bold());
}

/// Print the identity of the located run
pub fn run_located(user: &str, token: &CorrelationToken, run: &RunHandle) {
    println!("User: {}", user);
    println!("UUID: {}", token);
    println!("URL : {}", run.web_url().cyan());
}

/// Print the final conclusion of the run
pub fn conclusion(run: &RunHandle) {
    banner("JOB CONCLUSION");
    match run.conclusion() {
        Some(conclusion) if conclusion.is_success() => {
            println!("JOB: {}", conclusion.to_string().green())
        }
        Some(conclusion) => println!("JOB: {}", conclusion.to_string().red()),
        None => println!("JOB: {}", "unknown".yellow()),
    }
}

/// Print the extracted command output
pub fn command_output(output: &OutputBlock) {
    banner("COMMAND OUTPUT");
    println!("{}", output.display_text());
}
