use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lsc_ast::{Program, TypeRegistry};
use lsc_desugar::{check, desugar_program, ImportStyle, Options};

#[derive(Parser)]
#[command(name = "lsc", about = "LightScript desugarer: rewrites extension AST nodes to standard JavaScript")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Desugar a parsed program (JSON AST) and emit the result.
    Desugar {
        /// Input JSON AST file (stdin if omitted).
        input: Option<PathBuf>,
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit JavaScript source instead of the JSON AST.
        #[arg(long)]
        js: bool,
        /// Pretty-print the JSON AST output.
        #[arg(long)]
        pretty: bool,
        /// Use `import` declarations for injected stdlib helpers.
        #[arg(long)]
        esm: bool,
        /// Disable stdlib helper auto-import.
        #[arg(long)]
        no_stdlib: bool,
    },
    /// Validate, desugar, and run the output consistency checker.
    Check {
        input: Option<PathBuf>,
    },
    /// Emit JavaScript source for an already-standard JSON AST.
    Print {
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn read_program(input: &Option<PathBuf>) -> Result<Program> {
    let source = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    let mut program: Program =
        serde_json::from_str(&source).context("input is not a valid program AST")?;
    if let Err(errors) = TypeRegistry::global().validate_program(&mut program) {
        bail!("malformed input tree:\n{}", errors.join("\n"));
    }
    Ok(program)
}

fn write_out(output: &Option<PathBuf>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Desugar {
            input,
            output,
            js,
            pretty,
            esm,
            no_stdlib,
        } => {
            let program = read_program(&input)?;
            let mut options = Options::default();
            if esm {
                options.stdlib.style = ImportStyle::Import;
            }
            if no_stdlib {
                options.stdlib.enabled = false;
            }
            let desugared = desugar_program(program, &options)?;

            let text = if js {
                lsc_codegen::emit_program(&desugared)?
            } else if pretty {
                let mut text = serde_json::to_string_pretty(&desugared)?;
                text.push('\n');
                text
            } else {
                let mut text = serde_json::to_string(&desugared)?;
                text.push('\n');
                text
            };
            write_out(&output, &text)?;
        }
        Commands::Check { input } => {
            let program = read_program(&input)?;
            let mut desugared = desugar_program(program, &Options::default())?;
            if let Err(problems) = check::check_program(&mut desugared) {
                bail!("output consistency check failed:\n{}", problems.join("\n"));
            }
            eprintln!("OK");
        }
        Commands::Print { input, output } => {
            let program = read_program(&input)?;
            let text = lsc_codegen::emit_program(&program)?;
            write_out(&output, &text)?;
        }
    }

    Ok(())
}
