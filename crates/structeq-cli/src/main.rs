mod cli;
mod cmd;
mod error;
mod io;
mod logging;

use clap::Parser;
use structeq_core::{JsonShape, Value};

use crate::cli::{Cli, Command, PathOrStdin};
use crate::error::CliError;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let code = match run(&cli) {
        Ok(()) => 0,
        Err(CliError::Different) => 1,
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Compare {
            left,
            right,
            shape,
            config,
            ..
        } => {
            io::ensure_single_stdin([left, right])?;
            let shape = shape.shape();
            let left = load(left, cli.max_file_size, shape)?;
            let right = load(right, cli.max_file_size, shape)?;
            cmd::compare::run(
                &left,
                &right,
                &cli.command.options(),
                config.config(),
                cli.format,
            )
        }
        Command::Hash { files, shape } => {
            io::ensure_single_stdin(files)?;
            let shape = shape.shape();
            let documents = files
                .iter()
                .map(|source| Ok((source.label(), load(source, cli.max_file_size, shape)?)))
                .collect::<Result<Vec<_>, CliError>>()?;
            cmd::hash::run(&documents, cli.format)
        }
    }
}

fn load(source: &PathOrStdin, max_file_size: u64, shape: JsonShape) -> Result<Value, CliError> {
    let content = io::read_input(source, max_file_size)?;
    cmd::parse_document(&content, &source.label(), shape)
}
