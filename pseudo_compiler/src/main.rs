use pseudo_compiler::config::runtime::RuntimeConfig;
use pseudo_compiler::file_processor::clean_source;
use pseudo_compiler::utils::{SourceMap, Span};
use pseudo_compiler::{lexical, logging, pipeline};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
struct CliOptions {
    files: Vec<PathBuf>,
    dump_dir: Option<PathBuf>,
    json: bool,
    no_clean: bool,
    config_file: Option<PathBuf>,
    help: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("pseudo_compiler");

    let options = match parse_options(args.get(1..).unwrap_or(&[])) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            print_usage(program_name);
            std::process::exit(1);
        }
    };

    if options.help {
        print_help(program_name);
        return Ok(());
    }

    if options.files.is_empty() {
        print_usage(program_name);
        std::process::exit(1);
    }

    let mut config = match &options.config_file {
        Some(path) => RuntimeConfig::from_toml_file(path)?,
        None => RuntimeConfig::default(),
    };
    if options.no_clean {
        config.file_processor.apply_cleanup_filter = false;
    }

    // Initialize global logging system
    logging::init_global_logging_with_preferences(config.logging.clone())?;

    // Build the shared automaton once, before the first file
    lexical::init_lexical_analysis()?;

    let mut failed_files = Vec::new();
    for path in &options.files {
        if !compile_file(path, &config, &options) {
            failed_files.push(path);
        }
    }

    logging::print_cargo_style_summary();

    if !failed_files.is_empty() {
        eprintln!("\n{} of {} file(s) failed:", failed_files.len(), options.files.len());
        for path in failed_files {
            eprintln!("  {}", path.display());
        }
        std::process::exit(1);
    }

    Ok(())
}

fn print_usage(program_name: &str) {
    eprintln!(
        "Usage: {} <file>... [--dump-dir DIR] [--json] [--no-clean] [--config FILE]",
        program_name
    );
    eprintln!("       {} --help", program_name);
}

fn print_help(program_name: &str) {
    println!("Pseudo Compiler v{}", env!("CARGO_PKG_VERSION"));
    println!("Lexer, parser and type checker for the Spanish-keyword teaching language");
    println!();
    println!("USAGE:");
    println!("    {} <file>... [options]", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --dump-dir DIR      Write Res_<name>.txt token dumps into DIR");
    println!("    --json              Print the symbol table and diagnostics as JSON");
    println!("    --no-clean          Skip comment and elision stripping");
    println!("    --config FILE       Load runtime preferences from a TOML file");
    println!();
    println!("OUTPUT:");
    println!("    Symbol table listing (FUNCIONES / VARIABLES) per file");
    println!("    Semantic diagnostics and a token/symbol summary");
    println!("    Cargo-style error report grouped by file");
    println!();
    println!("BUILD:");
    println!("    {}", pseudo_compiler::config::build_info::source_info());
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                options.help = true;
            }
            "--dump-dir" => {
                let dir = args.get(i + 1).ok_or("--dump-dir requires a directory")?;
                options.dump_dir = Some(PathBuf::from(dir));
                i += 1;
            }
            "--config" => {
                let file = args.get(i + 1).ok_or("--config requires a file")?;
                options.config_file = Some(PathBuf::from(file));
                i += 1;
            }
            "--json" => {
                options.json = true;
            }
            "--no-clean" => {
                options.no_clean = true;
            }
            flag if flag.starts_with("--") => {
                eprintln!("Warning: Unknown option '{}'", flag);
            }
            file => {
                options.files.push(PathBuf::from(file));
            }
        }
        i += 1;
    }

    Ok(options)
}

/// Run one file through the pipeline and print its reports
fn compile_file(path: &Path, config: &RuntimeConfig, options: &CliOptions) -> bool {
    println!("Compiling {}", path.display());

    let result = match pipeline::process_file_with_config(path, config) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("FAILED: {}", error);
            print_detailed_error(&error);
            let span = match &error {
                pipeline::PipelineError::LexicalAnalysis(lex_err) => lex_err.span(),
                pipeline::PipelineError::SyntaxAnalysis(syntax_err) => syntax_err.span(),
                _ => None,
            };
            if let Some(span) = span {
                print_excerpt(path, config, &span, &error.to_string());
            }
            return false;
        }
    };

    let mut written = true;
    if let Some(dir) = &options.dump_dir {
        match pipeline::write_token_dump(&result.tokens, &result.file_metadata.base_name(), dir) {
            Ok(dump) => println!("Token dump: {}", dump.display()),
            Err(error) => {
                eprintln!("{}", error);
                written = false;
            }
        }
    }

    if options.json {
        let output = pipeline::PipelineOutput::new(
            path.display().to_string(),
            result.summary(),
            &result.symbol_table,
            &result.diagnostics,
        );
        match output.to_json() {
            Ok(json) => println!("{}", json),
            Err(error) => {
                eprintln!("JSON export failed: {}", error);
                written = false;
            }
        }
    } else {
        print!("{}", pipeline::format_symbol_report(&result.symbol_table));
        for diagnostic in &result.diagnostics {
            eprintln!("error[{}]: {}", diagnostic.error_code(), diagnostic);
        }
    }

    println!("Summary: {}", result.summary());

    match result.check() {
        Ok(()) => {
            println!("SUCCESS: {}", path.display());
            written
        }
        Err(error) => {
            eprintln!("FAILED: {}", error);
            false
        }
    }
}

/// Show the offending line of the text the lexer saw
fn print_excerpt(path: &Path, config: &RuntimeConfig, span: &Span, message: &str) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    let text = if config.file_processor.apply_cleanup_filter {
        match clean_source(&raw) {
            Ok(cleaned) => cleaned,
            Err(_) => return,
        }
    } else {
        raw
    };
    eprint!(
        "{}",
        SourceMap::named(path.display().to_string(), text).format_error(span, message)
    );
}

fn print_detailed_error(error: &pipeline::PipelineError) {
    match error {
        pipeline::PipelineError::FileProcessing(ref file_err) => {
            eprintln!("File processing stage failed:");
            eprintln!("  {}", file_err);
        }
        pipeline::PipelineError::LexicalAnalysis(ref lex_err) => {
            eprintln!("Lexical analysis stage failed:");
            eprintln!("  {}", lex_err);
        }
        pipeline::PipelineError::SyntaxAnalysis(ref syntax_err) => {
            eprintln!("Syntax analysis stage failed:");
            eprintln!("  {}", syntax_err);
            eprintln!("  help: {}", syntax_err.recommended_action());
        }
        pipeline::PipelineError::SemanticAnalysis(ref diagnostics) => {
            eprintln!("Semantic analysis stage failed:");
            for diagnostic in diagnostics {
                eprintln!("  {}", diagnostic);
            }
        }
        pipeline::PipelineError::OutputWrite { .. } => {
            eprintln!("Output stage failed:");
            eprintln!("  {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&strings(&[
            "a.txt",
            "--dump-dir",
            "out",
            "b.txt",
            "--json",
            "--no-clean",
            "--config",
            "prefs.toml",
        ]))
        .unwrap();

        assert_eq!(options.files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
        assert_eq!(options.dump_dir, Some(PathBuf::from("out")));
        assert_eq!(options.config_file, Some(PathBuf::from("prefs.toml")));
        assert!(options.json);
        assert!(options.no_clean);
        assert!(!options.help);
    }

    #[test]
    fn test_parse_options_missing_value() {
        assert!(parse_options(&strings(&["a.txt", "--dump-dir"])).is_err());
        assert!(parse_options(&strings(&["--config"])).is_err());
    }

    #[test]
    fn test_parse_options_unknown_flag_is_ignored() {
        let options = parse_options(&strings(&["--fast", "a.txt"])).unwrap();
        assert_eq!(options.files.len(), 1);
    }
}
