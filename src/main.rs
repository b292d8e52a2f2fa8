use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use c0::{analyse_source, DumpVisitor, Tokenizer};

#[derive(Parser)]
#[command(
    name = "c0c",
    version,
    about = "C0 front end — tokenize, analyse, dump"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dump the token stream of a source file
    Tokens {
        file: PathBuf,
        /// Also print a numbered source listing first
        #[arg(long)]
        listing: bool,
    },
    /// Analyse a source file and dump the typed tree
    Ast { file: PathBuf },
    /// Analyse a source file and render it back to C0 source
    Emit { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match &cli.command {
        Command::Tokens { file, listing } => cmd_tokens(file, *listing),
        Command::Ast { file } => cmd_ast(file),
        Command::Emit { file } => cmd_emit(file),
    }
}

fn read_input(file: &PathBuf) -> Result<String, ExitCode> {
    fs::read_to_string(file).map_err(|err| {
        eprintln!("cannot read {}: {err}", file.display());
        ExitCode::FAILURE
    })
}

fn cmd_tokens(file: &PathBuf, listing: bool) -> ExitCode {
    let source = match read_input(file) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let mut tokenizer = Tokenizer::new(&source);
    if listing {
        let _ = tokenizer.dump_lines(&mut io::stdout());
    }

    let tokens = tokenizer.all();
    let failed = tokens.last().map_or(false, |t| t.is_error());
    for token in &tokens {
        println!("{token}");
    }
    if failed {
        let last = tokens.last().unwrap();
        let _ = tokenizer.dump(last.range.start, &mut io::stderr());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn cmd_ast(file: &PathBuf) -> ExitCode {
    let source = match read_input(file) {
        Ok(source) => source,
        Err(code) => return code,
    };

    match analyse_source(&source, &file.display().to_string()) {
        Ok(ast) => {
            let mut dump = DumpVisitor::new();
            ast.accept(ast.root(), &mut dump);
            print!("{}", dump.finish());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_emit(file: &PathBuf) -> ExitCode {
    let source = match read_input(file) {
        Ok(source) => source,
        Err(code) => return code,
    };

    match analyse_source(&source, &file.display().to_string()) {
        Ok(ast) => {
            print!("{}", ast.to_source(ast.root()));
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
