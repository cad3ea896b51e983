use clap::{Parser as ClapParser, Subcommand};
use colexpr::OperatorRegistry;
use colexpr::cli::{self, CliError, CompileRequest, CompileResult};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "colexpr")]
#[command(about = "colexpr - compiles row, aggregate and window expressions for columnar queries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON object of named expressions
    Compile {
        /// JSON definitions, or a path to a file containing them (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only parse and validate, don't generate code
        #[arg(long)]
        check: bool,
    },

    /// List the built-in operators and functions
    Operators,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile {
            input,
            pretty,
            check,
        } => run_compile(input, pretty, check),
        Commands::Operators => {
            print!("{}", cli::list_operators(&OperatorRegistry::standard()));
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_input(input: Option<String>) -> Result<Option<String>, CliError> {
    match input {
        Some(s) if !s.trim_start().starts_with('{') && std::path::Path::new(&s).is_file() => {
            Ok(Some(std::fs::read_to_string(&s)?))
        }
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn run_compile(input: Option<String>, pretty: bool, check: bool) -> Result<(), CliError> {
    let request = CompileRequest {
        input: read_input(input)?,
        pretty,
        check_only: check,
    };

    match cli::execute_compile(&request)? {
        CompileResult::Valid(count) => println!("{} expression(s) are valid", count),
        CompileResult::Success { text, .. } => println!("{}", text),
    }
    Ok(())
}
