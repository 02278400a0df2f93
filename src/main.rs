//! Twin prime residue-class analysis CLI.
//!
//! Usage:
//!   twin-prime-moduli [--n=100000000] [--moduli=16,30,42,60,210]
//!                     [--precision=6] [--cap=N] [--sequential]
//!                     [--json=path/to/results.json]
//!
//! Options:
//!   --n=<N>           Upper bound: twins (p, p+2) with p < N (default: 10^8)
//!   --moduli=a,b,c    Comma-separated moduli to analyze
//!   --precision=<P>   Decimal places in the tables (default: 6)
//!   --cap=<K>         Iteration budget for the iterated Collatz weight
//!   --sequential      Disable the parallel counting pass
//!   --json=<path>     Write the full run artifact as JSON

use std::collections::HashMap;

use twin_prime_moduli::analysis::{self, AnalysisConfig};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = parse_args(&args);

    let mut config = AnalysisConfig::default();
    config.n = parse_u64(&opts, "n", config.n);
    config.precision = parse_usize(&opts, "precision", config.precision);
    config.weight_cap = opts.get("cap").map(|s| {
        s.parse().unwrap_or_else(|_| {
            eprintln!("Invalid --cap value: {}", s);
            std::process::exit(1);
        })
    });
    if opts.contains_key("sequential") {
        config.parallel = false;
    }
    if let Some(list) = opts.get("moduli") {
        config.moduli = parse_moduli(list);
    }

    println!(
        "Analyzing twin primes up to N = {} with moduli {:?}...",
        group_digits(config.n),
        config.moduli
    );

    let run = match analysis::run_analysis(&config) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    for report in &run.reports {
        analysis::print_report(report, config.precision);
    }
    for report in &run.reports {
        analysis::print_correlations(report);
    }

    println!("\nElapsed: {:.1}s", run.elapsed_secs);

    if let Some(path) = opts.get("json") {
        write_json(&run, path);
    }
}

fn parse_args(args: &[String]) -> HashMap<String, String> {
    let mut opts = HashMap::new();
    for arg in args {
        let trimmed = match arg.strip_prefix("--") {
            Some(t) => t,
            None => {
                eprintln!("Unexpected argument: {} (flags use --key=value)", arg);
                std::process::exit(1);
            }
        };
        match trimmed.split_once('=') {
            Some((key, value)) => opts.insert(key.to_string(), value.to_string()),
            None => opts.insert(trimmed.to_string(), String::new()),
        };
    }
    opts
}

fn parse_u64(opts: &HashMap<String, String>, key: &str, default: u64) -> u64 {
    match opts.get(key) {
        Some(s) => s.parse().unwrap_or_else(|_| {
            eprintln!("Invalid --{} value: {}", key, s);
            std::process::exit(1);
        }),
        None => default,
    }
}

fn parse_usize(opts: &HashMap<String, String>, key: &str, default: usize) -> usize {
    match opts.get(key) {
        Some(s) => s.parse().unwrap_or_else(|_| {
            eprintln!("Invalid --{} value: {}", key, s);
            std::process::exit(1);
        }),
        None => default,
    }
}

fn parse_moduli(list: &str) -> Vec<u64> {
    list.split(',')
        .map(|part| {
            part.trim().parse().unwrap_or_else(|_| {
                eprintln!("Invalid modulus in --moduli: {}", part);
                std::process::exit(1);
            })
        })
        .collect()
}

/// 1234567 → "1_234_567", matching the original study's N formatting.
fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('_');
        }
        out.push(c);
    }
    out
}

fn write_json<T: serde::Serialize>(value: &T, path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Warning: could not create directory {:?}: {}", parent, e);
                return;
            }
        }
    }
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                eprintln!("Warning: could not write {}: {}", path, e);
            } else {
                println!("Results written to {}", path);
            }
        }
        Err(e) => eprintln!("Warning: could not serialize results: {}", e),
    }
}
