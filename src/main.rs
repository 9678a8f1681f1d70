// ctree: typed C syntax trees and pluggable analysis passes

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use ctree::ast::TranslationUnit;
use ctree::passes::{
    collect_declarations, count_tokens, extract_expressions, find_unsafe_calls, histogram,
    unparse, FinderConfig,
};

/// Parse a C source file and run analysis passes over it.
#[derive(Debug, Parser)]
#[command(name = "ctree", version, about)]
struct Args {
    /// C source file to analyse
    file: PathBuf,

    /// Passes to run, in report order (default: all)
    #[arg(short, long = "pass", value_enum)]
    passes: Vec<Pass>,

    /// Run each pass on its own thread
    #[arg(long)]
    parallel: bool,

    /// Report only the first unsafe call
    #[arg(long)]
    first_only: bool,

    /// Extra function names to report as unsafe
    #[arg(long = "ban", value_name = "NAME")]
    banned: Vec<String>,

    /// Log parser and pass activity
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Pass {
    Tokens,
    Print,
    Kinds,
    Unsafe,
    Expressions,
    Declarations,
}

impl Pass {
    const ALL: [Pass; 6] = [
        Pass::Tokens,
        Pass::Print,
        Pass::Kinds,
        Pass::Unsafe,
        Pass::Expressions,
        Pass::Declarations,
    ];

    fn title(self) -> &'static str {
        match self {
            Pass::Tokens => "tokens",
            Pass::Print => "print",
            Pass::Kinds => "node kinds",
            Pass::Unsafe => "unsafe calls",
            Pass::Expressions => "expressions",
            Pass::Declarations => "declarations",
        }
    }

    fn run(self, unit: &TranslationUnit, finder: &FinderConfig) -> String {
        debug!(pass = self.title(), "running pass");
        match self {
            Pass::Tokens => format!("{}\n", count_tokens(unit)),
            Pass::Print => unparse(unit),
            Pass::Kinds => format!("{}\n", histogram(unit)),
            Pass::Unsafe => lines(find_unsafe_calls(unit, finder.clone())),
            Pass::Expressions => lines(extract_expressions(unit)),
            Pass::Declarations => lines(collect_declarations(unit)),
        }
    }
}

fn lines<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items.into_iter().map(|item| format!("{item}\n")).collect()
}

fn init_logging(verbose: bool) {
    let default = if verbose { "ctree=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let unit = ctree::parser::parse(&source)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;
    info!(
        file = %args.file.display(),
        declarations = unit.declarations().len(),
        "parsed"
    );

    let passes = if args.passes.is_empty() {
        Pass::ALL.to_vec()
    } else {
        args.passes.clone()
    };
    let mut finder = FinderConfig {
        stop_at_first: args.first_only,
        ..FinderConfig::default()
    };
    finder.banned.extend(args.banned.iter().cloned());

    let reports: Vec<String> = if args.parallel {
        // The tree is shared read-only; each pass owns its walker.
        thread::scope(|scope| {
            let handles: Vec<_> = passes
                .iter()
                .map(|&pass| {
                    let (unit, finder) = (&unit, &finder);
                    scope.spawn(move || pass.run(unit, finder))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().map_err(|_| anyhow::anyhow!("pass panicked")))
                .collect::<Result<_>>()
        })?
    } else {
        passes.iter().map(|pass| pass.run(&unit, &finder)).collect()
    };

    for (pass, report) in passes.iter().zip(reports) {
        println!("== {} ==", pass.title());
        print!("{report}");
    }

    Ok(())
}
