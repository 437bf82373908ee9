use std::process::exit;

use colored::Colorize;

fn main() {
    if let Err(e) = bpbd_board::app::run_cli() {
        eprintln!("{} {}", "error:".red().bold(), e.red());
        exit(1);
    }
}
