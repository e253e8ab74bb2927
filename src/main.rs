#![allow(nonstandard_style)]

use clap::Parser;
use colored::Colorize;
use log::{error, info};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use shell_calc::config::{self, Options};
use shell_calc::exchanging::{HttpRates, NoRates, RateSource};
use shell_calc::plotting::TerminalPlotter;
use shell_calc::{CalcError, Reply, Session};
use std::process::ExitCode;

const LOGO: &str = r"
   ___ _        _ _         _
  / __| |_  ___| | |  __ __| |__
  \__ \ ' \/ -_) | | / _/ _` / _|
  |___/_||_\___|_|_| \__\__,_\__|
";

const GREETING: &str = "Scientific Calculator Shell (type 'exit' to quit)";

enum Command {
    exit,
    clear,
    delete,
}

fn command(line: &str) -> Option<Command> {
    match line.to_lowercase().as_str() {
        "exit" | "quit" => Some(Command::exit),
        "clear" | "clr" | "cls" | "ac" => Some(Command::clear),
        "delete" | "del" | "dlt" => Some(Command::delete),
        _ => None,
    }
}

fn banner() {
    print!("\x1B[2J\x1B[1;1H");
    println!("{}", LOGO.cyan());
    println!("{GREETING}");
}

fn show(result: &Result<Reply, CalcError>) {
    match result {
        Ok(reply) => println!("{}", reply.to_string().yellow()),
        Err(e) => println!("{}", format!("Error: {e}").red()),
    }
}

fn rates(options: &Options) -> Box<dyn RateSource> {
    match HttpRates::new(&options.rates_url, options.timeout()) {
        Ok(rates) => Box::new(rates),
        Err(e) => {
            error!("currency conversion disabled, could not build HTTP client: {e}");
            Box::new(NoRates)
        },
    }
}

fn shell(session: &mut Session) -> rustyline::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let prompt = "calc> ".green().to_string();

    banner();
    loop {
        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\nExiting calculator.");
                return Ok(());
            },
            Err(e) => return Err(e),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        editor.add_history_entry(line)?;

        match command(line) {
            Some(Command::exit) => return Ok(()),
            Some(Command::clear) => banner(),
            Some(Command::delete) => {
                session.clear();
                banner();
                println!("{}", "All stored variables and functions deleted.".red());
            },
            None => show(&session.process(line)),
        }
    }
}

fn main() -> ExitCode {
    let options = Options::parse();
    config::init_logger(options.log_level);
    if options.no_color {
        colored::control::set_override(false);
    }

    let mut session = Session::new(rates(&options), Box::new(TerminalPlotter::default()));

    if let Some(line) = options.line() {
        let result = session.process(&line);
        show(&result);
        return if result.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE };
    }

    info!("starting shell");
    match shell(&mut session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("reading input failed: {e}");
            ExitCode::FAILURE
        },
    }
}
