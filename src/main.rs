use clap::{Parser, Subcommand};
use jmmc::diagnostics::{render_diagnostic, render_error, CompileError};
use jmmc::manifest::{self, BuildConfig};
use jmmc::LoadedInput;
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "jmmc", version, about = "The Jmm compiler")]
struct Cli {
    /// Log pipeline stages to stderr (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run semantic analysis and print diagnostics
    Check {
        /// Source file (.jmm) or serialized tree (.json)
        file: PathBuf,
    },
    /// Print the intermediate representation
    Ir {
        file: PathBuf,
    },
    /// Print the generated assembly
    Asm {
        file: PathBuf,
    },
    /// Compile and write outputs as configured by jmm.toml
    Compile {
        file: PathBuf,
        /// Output directory (overrides the manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Manifest path (defaults to jmm.toml next to the input)
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Parse a source file and write its tree as JSON
    EmitAst {
        file: PathBuf,
        /// Output path. If omitted, prints to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(level)
        .init();
}

/// Report a fatal error against the input file and exit.
fn fail(file: &Path, source: Option<&str>, err: &CompileError) -> ! {
    render_error(source.unwrap_or(""), &file.to_string_lossy(), err);
    std::process::exit(1);
}

fn load(file: &Path) -> LoadedInput {
    match jmmc::load_input(file) {
        Ok(input) => input,
        Err(err) => {
            // syntax errors need the text to render
            let source = std::fs::read_to_string(file).ok();
            fail(file, source.as_deref(), &err)
        }
    }
}

fn print_diagnostics(file: &Path, input: &LoadedInput, diagnostics: &[jmmc::diagnostics::Diagnostic]) {
    let filename = file.to_string_lossy();
    for diag in diagnostics {
        match &input.source {
            Some(source) => render_diagnostic(source, &filename, diag),
            None => eprintln!("{filename}: {diag}"),
        }
    }
}

fn compile(file: &Path) -> (LoadedInput, jmmc::Compilation) {
    let input = load(file);
    match jmmc::compile_program(&input.program) {
        Ok(compilation) => (input, compilation),
        Err(err) => fail(file, input.source.as_deref(), &err),
    }
}

fn resolve_config(file: &Path, output: Option<PathBuf>, manifest_path: Option<PathBuf>) -> Result<BuildConfig, CompileError> {
    let mut config = match manifest_path {
        Some(path) => manifest::load_manifest(&path)?,
        None => manifest::find_config(file)?,
    };
    if let Some(dir) = output {
        config.output_dir = dir;
    }
    Ok(config)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { file } => {
            let input = load(&file);
            let diagnostics = jmmc::analyze(&input.program);
            print_diagnostics(&file, &input, &diagnostics);
            if !diagnostics.is_empty() {
                eprintln!("{} error(s) found", diagnostics.len());
                std::process::exit(1);
            }
        }
        Commands::Ir { file } => {
            let (_, compilation) = compile(&file);
            print!("{}", compilation.ir_text());
        }
        Commands::Asm { file } => {
            let (_, compilation) = compile(&file);
            print!("{}", compilation.assembly);
        }
        Commands::Compile { file, output, manifest } => {
            let config = match resolve_config(&file, output, manifest) {
                Ok(config) => config,
                Err(err) => fail(&file, None, &err),
            };
            let (input, compilation) = compile(&file);
            print_diagnostics(&file, &input, &compilation.diagnostics);
            if config.deny_diagnostics && compilation.has_errors() {
                eprintln!("{} error(s) found; no output written", compilation.diagnostics.len());
                std::process::exit(1);
            }
            match jmmc::write_outputs(&compilation, &config) {
                Ok(paths) => {
                    for path in paths {
                        eprintln!("  wrote {}", path.display());
                    }
                }
                Err(err) => fail(&file, None, &err),
            }
        }
        Commands::EmitAst { file, output } => {
            let input = load(&file);
            let json = match jmmc::ast_to_json(&input.program) {
                Ok(json) => json,
                Err(err) => fail(&file, None, &err),
            };
            match output {
                Some(path) => {
                    if let Err(e) = std::fs::write(&path, json) {
                        fail(&file, None, &CompileError::io(format!("cannot write output: {e}"), path));
                    }
                }
                None => println!("{json}"),
            }
        }
    }
}
