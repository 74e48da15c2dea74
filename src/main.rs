use colored::Colorize;

use config_gui_gen::cli::CommandLineInterface;
use config_gui_gen::logging::{init_logging, LoggingConfig};

fn main() {
    let command_line_interface = CommandLineInterface::load();
    init_logging(LoggingConfig::default().with_verbosity(command_line_interface.verbosity()));
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
