/// huffpack – CLI front end for static Huffman compression.
///
/// Works similar to gzip:
///   huffpack file.txt           → compress to file.txt.huf (removes original)
///   huffpack -d file.txt.huf    → decompress to file.txt (removes original)
///   huffpack -c file.txt        → compress to stdout
///   huffpack -k file.txt        → keep original after compress
///   huffpack -l file.txt.huf    → list header info about a compressed file
///   huffpack -s file.txt        → print symbol frequencies and codes
///   huffpack -i                 → interactive menu
///   cat file | huffpack -c      → compress stdin to stdout
///   cat file | huffpack -dc     → decompress stdin to stdout
use std::env;
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;
use std::process::{self, ExitCode};

use huffpack::file::{self, FileReport};
use huffpack::frequency;
use huffpack::huffman::HuffmanTree;
use huffpack::PackError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
const LOG_ENV: &str = "HUFFPACK_LOG";

fn usage() {
    eprintln!("huffpack - static Huffman compression tool");
    eprintln!();
    eprintln!("Usage: huffpack [OPTIONS] [FILE]...");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -d, --decompress   Decompress mode");
    eprintln!("  -c, --stdout       Write to stdout (don't remove original)");
    eprintln!("  -k, --keep         Keep original file");
    eprintln!("  -f, --force        Overwrite existing output files");
    eprintln!("  -l, --list         List info about compressed file");
    eprintln!("  -s, --stats        Print symbol frequencies and codes of a file");
    eprintln!("  -i, --interactive  Menu-driven mode");
    eprintln!("  -q, --quiet        Only report errors");
    eprintln!("  -v, --verbose      Verbose output (repeat for more)");
    eprintln!("  -h, --help         Show this help");
    eprintln!();
    eprintln!("If no FILE is given, reads from stdin and writes to stdout.");
    eprintln!(
        "Compressed files use the .{} extension. Set {LOG_ENV} to override log filtering.",
        file::EXTENSION
    );
}

#[derive(Debug, Default)]
struct Opts {
    decompress: bool,
    to_stdout: bool,
    keep: bool,
    force: bool,
    list: bool,
    stats: bool,
    interactive: bool,
    verbose: u8,
    quiet: bool,
    files: Vec<String>,
}

fn parse_args() -> Opts {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut opts = Opts::default();

    for arg in &args {
        match arg.as_str() {
            "-d" | "--decompress" => opts.decompress = true,
            "-c" | "--stdout" | "--to-stdout" => opts.to_stdout = true,
            "-k" | "--keep" => opts.keep = true,
            "-f" | "--force" => opts.force = true,
            "-l" | "--list" => opts.list = true,
            "-s" | "--stats" => opts.stats = true,
            "-i" | "--interactive" => opts.interactive = true,
            "-v" | "--verbose" => opts.verbose = opts.verbose.saturating_add(1),
            "-q" | "--quiet" => opts.quiet = true,
            "-h" | "--help" => {
                usage();
                process::exit(0);
            }
            // Handle combined short flags like -dc, -kv, etc.
            s if s.starts_with('-') && !s.starts_with("--") && s.len() > 2 => {
                for ch in s[1..].chars() {
                    match ch {
                        'd' => opts.decompress = true,
                        'c' => opts.to_stdout = true,
                        'k' => opts.keep = true,
                        'f' => opts.force = true,
                        'l' => opts.list = true,
                        's' => opts.stats = true,
                        'i' => opts.interactive = true,
                        'v' => opts.verbose = opts.verbose.saturating_add(1),
                        'q' => opts.quiet = true,
                        _ => {
                            eprintln!("huffpack: unknown flag '-{ch}'");
                            process::exit(1);
                        }
                    }
                }
            }
            s if s.starts_with("--") => {
                eprintln!("huffpack: unknown option '{s}'");
                process::exit(1);
            }
            _ => opts.files.push(arg.clone()),
        }
    }

    opts
}

/// Install the stderr subscriber. `HUFFPACK_LOG` wins over -v/-q.
fn init_logging(opts: &Opts) {
    let default = if opts.quiet {
        "error"
    } else {
        match opts.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Prefix an error with the path it concerns unless it already names one.
fn describe(path: &str, e: PackError) -> String {
    match e {
        PackError::FileNotFound(_) | PackError::OutputExists(_) => e.to_string(),
        _ => format!("{path}: {e}"),
    }
}

fn read_input(path: &str) -> Result<Vec<u8>, String> {
    if !Path::new(path).is_file() {
        return Err(PackError::FileNotFound(path.into()).to_string());
    }
    fs::read(path).map_err(|e| format!("{path}: {e}"))
}

fn report(path: &str, r: &FileReport) {
    info!(
        "{path}: {:.1}% ({} → {} bytes)",
        r.ratio(),
        r.input_len,
        r.output_len
    );
}

fn remove_original(opts: &Opts, path: &str) -> Result<(), String> {
    if !opts.keep {
        fs::remove_file(path).map_err(|e| format!("{path}: cannot remove: {e}"))?;
    }
    Ok(())
}

fn process_compress(opts: &Opts, path: &str) -> Result<(), String> {
    if opts.to_stdout {
        let data = read_input(path)?;
        let encoded = huffpack::encode(&data).map_err(|e| describe(path, e))?;
        return io::stdout()
            .write_all(&encoded)
            .map_err(|e| format!("stdout: {e}"));
    }

    let out_path = file::compressed_path(Path::new(path));
    let r = file::compress_file(Path::new(path), &out_path, opts.force)
        .map_err(|e| describe(path, e))?;
    report(path, &r);
    remove_original(opts, path)
}

fn process_decompress(opts: &Opts, path: &str) -> Result<(), String> {
    if opts.to_stdout {
        let data = read_input(path)?;
        let decoded = huffpack::decode(&data).map_err(|e| describe(path, e))?;
        return io::stdout()
            .write_all(&decoded)
            .map_err(|e| format!("stdout: {e}"));
    }

    let out_path = file::decompressed_path(Path::new(path))
        .ok_or_else(|| format!("{path}: unknown suffix -- ignored"))?;
    let r = file::decompress_file(Path::new(path), &out_path, opts.force)
        .map_err(|e| describe(path, e))?;
    report(path, &r);
    remove_original(opts, path)
}

fn list_file(path: &str) -> Result<(), String> {
    let data = read_input(path)?;
    let summary = huffpack::inspect(&data).map_err(|e| describe(path, e))?;
    let ratio = if summary.symbol_count > 0 {
        (data.len() as f64 / summary.symbol_count as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "{:>12} {:>12} {:5.1}% {:>7} {:>8} {}",
        summary.symbol_count,
        data.len(),
        ratio,
        summary.distinct,
        summary.header_len,
        path,
    );
    Ok(())
}

fn symbol_label(symbol: u8) -> String {
    if symbol.is_ascii_graphic() || symbol == b' ' {
        format!("'{}'", symbol as char)
    } else {
        format!("{symbol:#04x}")
    }
}

fn stats_file(path: &str) -> Result<(), String> {
    let data = read_input(path)?;
    let freq = frequency::get_frequency(&data);
    if freq.is_empty() {
        println!("{path}: empty");
        return Ok(());
    }
    let table = HuffmanTree::build(&freq)
        .map_err(|e| describe(path, e))?
        .code_table();

    println!("{path}:");
    println!("  {:>6} {:>12}  code", "symbol", "frequency");
    for (symbol, code) in table.iter() {
        println!(
            "  {:>6} {:>12}  {}",
            symbol_label(symbol),
            freq.get(symbol),
            code
        );
    }
    let bits = table.encoded_bits(&freq);
    println!(
        "  {} symbols, {} distinct, entropy {:.3} bits/symbol, average code {:.3} bits/symbol",
        freq.total,
        freq.used,
        freq.entropy(),
        bits as f64 / freq.total as f64
    );
    Ok(())
}

fn process_stdin_stdout(opts: &Opts) -> Result<(), String> {
    let mut input = Vec::new();
    io::stdin()
        .read_to_end(&mut input)
        .map_err(|e| format!("stdin: {e}"))?;

    let output = if opts.decompress {
        huffpack::decode(&input)
    } else {
        huffpack::encode(&input)
    }
    .map_err(|e| describe("stdin", e))?;

    io::stdout()
        .write_all(&output)
        .map_err(|e| format!("stdout: {e}"))
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, text: &str) -> Option<String> {
    print!("{text}");
    let _ = io::stdout().flush();
    lines.next()?.ok().map(|l| l.trim().to_string())
}

/// Numbered menu: compress, decompress, or exit.
fn interactive(opts: &Opts) -> Result<(), ()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut had_error = false;

    loop {
        println!();
        println!("Select an option:");
        println!("  1) Compress a file");
        println!("  2) Decompress a file");
        println!("  3) Exit");
        let Some(choice) = prompt(&mut lines, "> ") else {
            break;
        };

        let result = match choice.as_str() {
            "1" => prompt(&mut lines, "File to compress: ").map(|path| {
                let out = file::compressed_path(Path::new(&path));
                file::compress_file(Path::new(&path), &out, opts.force)
                    .map(|r| println!("{path} compressed to {} ({:.1}%)", out.display(), r.ratio()))
                    .map_err(|e| describe(&path, e))
            }),
            "2" => prompt(&mut lines, "File to decompress: ").map(|path| {
                match file::decompressed_path(Path::new(&path)) {
                    Some(out) => file::decompress_file(Path::new(&path), &out, opts.force)
                        .map(|_| println!("{path} decompressed to {}", out.display()))
                        .map_err(|e| describe(&path, e)),
                    None => Err(format!("{path}: unknown suffix -- ignored")),
                }
            }),
            "3" | "q" => break,
            other => {
                warn!("unknown menu option '{other}'");
                continue;
            }
        };

        match result {
            Some(Err(e)) => {
                eprintln!("huffpack: {e}");
                had_error = true;
            }
            Some(Ok(())) => {}
            None => break,
        }
    }

    if had_error {
        Err(())
    } else {
        Ok(())
    }
}

fn run() -> Result<(), ()> {
    let opts = parse_args();
    init_logging(&opts);
    let mut had_error = false;

    if opts.interactive {
        return interactive(&opts);
    }

    if opts.files.is_empty() {
        // stdin/stdout mode
        if opts.list || opts.stats {
            eprintln!("huffpack: -l and -s require a file argument");
            return Err(());
        }
        if let Err(e) = process_stdin_stdout(&opts) {
            eprintln!("huffpack: {e}");
            return Err(());
        }
        return Ok(());
    }

    if opts.list {
        println!(
            "{:>12} {:>12} {:>6} {:>7} {:>8} name",
            "original", "compressed", "ratio", "symbols", "header"
        );
    }

    for path in &opts.files {
        let result = if opts.list {
            list_file(path)
        } else if opts.stats {
            stats_file(path)
        } else if path == "-" {
            process_stdin_stdout(&opts)
        } else if opts.decompress {
            process_decompress(&opts, path)
        } else {
            process_compress(&opts, path)
        };

        if let Err(e) = result {
            eprintln!("huffpack: {e}");
            had_error = true;
        }
    }

    if had_error {
        Err(())
    } else {
        Ok(())
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}
