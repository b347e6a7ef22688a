// src/main.rs

mod cli;

use clap::Parser;
use cli::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::process::ExitCode;
use std::time::Instant;
use subete::{LanguageCollection, Repo, TestStatus};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    let start_time = Instant::now();

    let mut builder = Repo::builder()
        .remote(args.remote.clone())
        .show_progress(args.progress);
    if let Some(dir) = &args.source_dir {
        builder = builder.source_dir(dir.clone());
    }
    if let Some(dir) = &args.docs_dir {
        builder = builder.docs_dir(dir.clone());
    }

    let repo = match builder.load() {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("Error loading repository: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!(
        "Loaded {} languages with {} programs in {:.2?}; {} languages have tests.",
        repo.total_languages(),
        repo.total_programs(),
        start_time.elapsed(),
        repo.total_tests()
    );
    if repo.total_approved_projects() > 0 {
        println!("{} approved projects.", repo.total_approved_projects());
    }

    if let Some(name) = &args.language {
        match repo.language(name) {
            Ok(language) => print_language(language),
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    if let Some(program) = repo.random_program(&mut rng) {
        println!("Random pick: {}", program);
        if let Some(modified) = program.modified() {
            println!("  last modified {}", modified.to_rfc2822());
        }
        if !program.authors().is_empty() {
            let authors: Vec<&str> = program.authors().iter().map(String::as_str).collect();
            println!("  authors: {}", authors.join(", "));
        }
    }

    ExitCode::SUCCESS
}

fn init_logging(verbose: bool) {
    let default = if verbose { "subete=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_language(language: &LanguageCollection) {
    println!(
        "{} ({} programs, {} lines, {} bytes)",
        language,
        language.total_programs(),
        language.total_line_count(),
        language.total_size()
    );
    for program in language.programs() {
        let status = match program.test_status() {
            TestStatus::Tested => "tested",
            TestStatus::NotTested => "untested",
            TestStatus::Untestable { .. } => "untestable",
            TestStatus::NoData => "no test data",
        };
        println!("  {:<40} {:<12} {}", program.project_name(), status, program.file_name());
    }
    if language.missing_programs_count() > 0 {
        println!("  missing: {}", language.missing_programs().join(", "));
    }
}
