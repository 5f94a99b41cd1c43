//! # Scope Document Validator
//!
//! A command-line utility for checking group scope files before they are
//! uploaded to the console.
//!
//! ## Overview
//!
//! The console imports scope files leniently: members it cannot read are
//! skipped, and whatever remains is applied to the form. This utility runs the
//! same import and reports what the console would actually pick up:
//! - JSON syntax and top-level shape
//! - Presence of a scope name
//! - The server-access rules, mappings, agents and UI permissions read
//! - The normalized document the console would produce from it
//!
//! ## Usage
//!
//! ### Validate a Single Scope File
//!
//! ```bash
//! cargo run --bin scope-validator example-group-scope.json
//! ```
//!
//! ### Validate All Scope Files in a Directory
//!
//! ```bash
//! cargo run --bin scope-validator ./scopes/
//! ```
//!
//! ## Output Examples
//!
//! ```text
//! Validating scope file: example-group-scope.json
//! ✓ Scope is valid!
//!
//! Scope Summary:
//!   Name: currenttime-users
//!   Server rules: 1
//!   Group mappings: 1
//!   Agents: 0
//!   UI permissions: 2
//!   Create in IdP: true
//!
//! Normalized document:
//! { ... }
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: All scope files are valid
//! - `1`: One or more files are invalid or could not be read

use iam_console::scope::{self, ScopeConfig, ScopeForm};
use std::env;
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scope-file-or-directory>", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} example-group-scope.json", args[0]);
        eprintln!("  {} ./scopes/", args[0]);
        process::exit(1);
    }

    let path = Path::new(&args[1]);

    if path.is_file() {
        validate_single_file(path);
    } else if path.is_dir() {
        validate_directory(path);
    } else {
        eprintln!(
            "Error: '{}' is not a valid file or directory",
            path.display()
        );
        process::exit(1);
    }
}

fn validate_single_file(file_path: &Path) {
    println!("Validating scope file: {}", file_path.display());

    match load_scope(file_path) {
        Ok(scope) => {
            println!("✓ Scope is valid!");
            print_scope_summary(&scope);
            match scope.to_pretty_json() {
                Ok(json) => println!("\nNormalized document:\n{}", json),
                Err(e) => {
                    eprintln!("❌ Failed to render scope: {}", e);
                    process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Scope validation failed: {}", e);
            process::exit(1);
        }
    }
}

fn validate_directory(dir_path: &Path) {
    println!("Validating scope files in directory: {}", dir_path.display());

    let entries = match fs::read_dir(dir_path) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error reading directory: {}", e);
            process::exit(1);
        }
    };

    let mut valid_count = 0;
    let mut error_count = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("\nValidating: {}", file_name);

        match load_scope(&path) {
            Ok(scope) => {
                println!(
                    "  ✓ Valid - {} ({} server rules)",
                    scope.scope_name,
                    scope.server_access.len()
                );
                valid_count += 1;
            }
            Err(e) => {
                eprintln!("  ❌ Invalid - {}", e);
                error_count += 1;
            }
        }
    }

    println!("\nValidation Summary:");
    println!("  Valid scopes: {}", valid_count);
    println!("  Invalid scopes: {}", error_count);

    if error_count > 0 {
        process::exit(1);
    }
}

/// Import a file the way the console does and re-encode the result.
fn load_scope(file_path: &Path) -> Result<ScopeConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file_path)?;
    let patch = scope::decode(&content)?;
    if patch.is_empty() {
        return Err("No recognizable scope members".into());
    }

    let mut form = ScopeForm::new();
    form.apply(patch);
    if form.trimmed_name().is_empty() {
        return Err("Scope missing required 'scope_name' field".into());
    }

    Ok(form.encode())
}

fn print_scope_summary(scope: &ScopeConfig) {
    println!("\nScope Summary:");
    println!("  Name: {}", scope.scope_name);
    if let Some(description) = &scope.description {
        println!("  Description: {}", description);
    }
    println!("  Server rules: {}", scope.server_access.len());
    for rule in &scope.server_access {
        let tools = rule
            .tools
            .as_ref()
            .map(|t| t.to_names().join(", "))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "    - {} [{}] tools: {}",
            rule.server,
            rule.methods.join(", "),
            tools
        );
    }
    println!("  Group mappings: {}", scope.group_mappings.len());
    println!("  Agents: {}", scope.agent_access.len());
    println!("  UI permissions: {}", scope.ui_permissions.len());
    println!("  Create in IdP: {}", scope.create_in_idp);
}
