//! Command-line interface for MARDS
//! This binary parses, checks, and converts MARDS documents and schemas.
//!
//! Usage:
//!   mards tree `<path>` [--strict]                                - Parse a document and print its tree
//!   mards check `<path>` --schema `<schema>`                      - Validate a document against a schema
//!   mards schema `<path>`                                         - Compile a schema and print its normalized form
//!   mards convert `<path>` --schema `<schema>` [--format `<fmt>`] - Emit a validated document as json/yaml

use clap::{Arg, ArgAction, Command};
use std::path::Path;

use mards::mards::{
    check_document, compile_schema, convert, has_errors, parse_document, render, CompileOptions,
    Diagnostic, ParseOptions, QuoteStyle, Schema,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let matches = Command::new("mards")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for parsing, checking, and converting MARDS documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tree")
                .about("Parse a document and print its tree")
                .arg(
                    Arg::new("path")
                        .help("Path to the MARDS document")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .help("Demand 4-space indents instead of adapting to the file")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate a document against a schema")
                .arg(
                    Arg::new("path")
                        .help("Path to the MARDS document")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("schema")
                        .long("schema")
                        .short('s')
                        .help("Path to the MARDS schema")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("schema")
                .about("Compile a schema and print its normalized form")
                .arg(
                    Arg::new("path")
                        .help("Path to the MARDS schema")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Emit a validated document in another format")
                .arg(
                    Arg::new("path")
                        .help("Path to the MARDS document")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("schema")
                        .long("schema")
                        .short('s')
                        .help("Path to the MARDS schema")
                        .required(true),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (e.g. 'json', 'yaml')")
                        .default_value("json"),
                ),
        )
        .get_matches();

    // Handle subcommands
    match matches.subcommand() {
        Some(("tree", tree_matches)) => {
            let path = tree_matches.get_one::<String>("path").unwrap();
            handle_tree_command(path, tree_matches.get_flag("strict"));
        }
        Some(("check", check_matches)) => {
            let path = check_matches.get_one::<String>("path").unwrap();
            let schema = check_matches.get_one::<String>("schema").unwrap();
            handle_check_command(path, schema);
        }
        Some(("schema", schema_matches)) => {
            let path = schema_matches.get_one::<String>("path").unwrap();
            handle_schema_command(path);
        }
        Some(("convert", convert_matches)) => {
            let path = convert_matches.get_one::<String>("path").unwrap();
            let schema = convert_matches.get_one::<String>("schema").unwrap();
            let format = convert_matches.get_one::<String>("format").unwrap();
            handle_convert_command(path, schema, format);
        }
        _ => unreachable!(),
    }
}

/// Handle the tree command
fn handle_tree_command(path: &str, strict: bool) {
    let text = read_or_exit(path);
    let options = ParseOptions {
        strict,
        ..ParseOptions::default()
    };
    let (tree, diagnostics) = parse_document(&text, &options);
    report(&diagnostics);
    print!("{}", render(&tree, QuoteStyle::ByNeed));
    if has_errors(&diagnostics) {
        std::process::exit(1);
    }
}

/// Handle the check command
fn handle_check_command(path: &str, schema_path: &str) {
    let (schema, mut diagnostics) = compile_from(schema_path);
    let text = read_or_exit(path);
    let (mut doc, parse_diagnostics) = parse_document(&text, &ParseOptions::default());
    diagnostics.extend(parse_diagnostics);
    diagnostics.extend(check_document(&mut doc, &schema));
    report(&diagnostics);
    if has_errors(&diagnostics) {
        std::process::exit(1);
    }
}

/// Handle the schema command
fn handle_schema_command(path: &str) {
    let (schema, diagnostics) = compile_from(path);
    report(&diagnostics);
    print!("{}", render(schema.tree(), QuoteStyle::ByNeed));
    if has_errors(&diagnostics) {
        std::process::exit(1);
    }
}

/// Handle the convert command
fn handle_convert_command(path: &str, schema_path: &str, format: &str) {
    let (schema, mut diagnostics) = compile_from(schema_path);
    let text = read_or_exit(path);
    let (mut doc, parse_diagnostics) = parse_document(&text, &ParseOptions::default());
    diagnostics.extend(parse_diagnostics);
    diagnostics.extend(check_document(&mut doc, &schema));
    report(&diagnostics);
    match convert(&doc, format) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
    if has_errors(&diagnostics) {
        std::process::exit(1);
    }
}

/// Compile a schema file, resolving its imports next to it
fn compile_from(path: &str) -> (Schema, Vec<Diagnostic>) {
    let text = read_or_exit(path);
    let options = CompileOptions {
        schema_dir: Path::new(path).parent().map(Path::to_path_buf),
        ..CompileOptions::default()
    };
    compile_schema(&text, &options)
}

fn read_or_exit(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
}
