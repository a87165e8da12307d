//! PDO/RDO literal decoder
//! Decodes 32-bit Power Data Objects and Request Data Objects given on the command line

use anyhow::Context;
use std::env;
use tracing_subscriber::{prelude::*, EnvFilter};
use usbpd_rs::codec::{
    classify_pdo_with, decode_pdo_with, decode_rdo, parse_reference, parse_word, render_lines,
    AvsConvention, DecodedField, PdoContext, RdoReference,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Pdo,
    Rdo(RdoReference),
}

#[derive(Debug)]
struct Options {
    verbose: u8,
    json: bool,
    first: bool,
    sink: bool,
    avs: AvsConvention,
    mode: Mode,
    literals: Vec<String>,
}

fn usage(prog: &str) {
    eprintln!(
        "Usage: {} [-v] [--json] pdo [--first] [--sink] [--spr] LITERAL...",
        prog
    );
    eprintln!("       {} [-v] [--json] rdo REF LITERAL...", prog);
    eprintln!("\nLITERAL is decimal or 0x-prefixed hex, at most 32 bits.");
    eprintln!("REF names the PDO type the request refers to:");
    eprintln!("  F or V  fixed or variable supply");
    eprintln!("  B       battery supply");
    eprintln!("  P       programmable supply (PPS)");
    eprintln!("  A, E, S adjustable supply (AVS)");
    eprintln!("\nExamples:");
    eprintln!("  {} pdo --first 0x0a01912c", prog);
    eprintln!("  {} rdo F 0x1304b0c8", prog);
}

fn parse_args(args: &[String]) -> anyhow::Result<Options> {
    let mut verbose = 0u8;
    let mut json = false;
    let mut first = false;
    let mut sink = false;
    let mut avs = AvsConvention::Epr;
    let mut positional = Vec::new();

    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = verbose.saturating_add(1),
            "-vv" => verbose = verbose.saturating_add(2),
            "-j" | "--json" => json = true,
            "--first" => first = true,
            "--sink" => sink = true,
            "--source" => sink = false,
            "--spr" => avs = AvsConvention::Spr,
            "--epr" => avs = AvsConvention::Epr,
            s if s.starts_with("--") => anyhow::bail!("Unknown option: {}", s),
            s => positional.push(s.to_string()),
        }
    }

    let mut positional = positional.into_iter();
    let mode = match positional.next().as_deref() {
        Some("pdo") => Mode::Pdo,
        Some("rdo") => {
            let code = positional
                .next()
                .context("rdo requires a reference code before the literals")?;
            Mode::Rdo(parse_reference(&code)?)
        }
        Some(other) => anyhow::bail!("Unknown mode '{}', expected pdo or rdo", other),
        None => anyhow::bail!("Missing mode, expected pdo or rdo"),
    };

    let literals: Vec<String> = positional.collect();
    if literals.is_empty() {
        anyhow::bail!("No literal given");
    }

    Ok(Options {
        verbose,
        json,
        first,
        sink,
        avs,
        mode,
        literals,
    })
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();
    Ok(())
}

fn decode_one(opts: &Options, word: u32) -> (String, Vec<DecodedField>) {
    match opts.mode {
        Mode::Pdo => {
            let ctx = PdoContext {
                object_index_is_one: opts.first,
                is_source: !opts.sink,
                avs: opts.avs,
            };
            let variant = classify_pdo_with(word, opts.avs);
            (variant.to_string(), decode_pdo_with(word, &ctx))
        }
        Mode::Rdo(reference) => (format!("{} request", reference), decode_rdo(word, reference)),
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("pd-decode");

    let opts = match parse_args(&args) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("{}: {}\n", prog, e);
            usage(prog);
            std::process::exit(1);
        }
    };
    init_tracing(opts.verbose)?;
    tracing::debug!("Options: {:?}", opts);

    let mut failures = 0usize;
    let mut json_out = Vec::new();
    let many = opts.literals.len() > 1;

    for literal in &opts.literals {
        let word = match parse_word(literal) {
            Ok(word) => word,
            Err(e) => {
                eprintln!("{}: {}", prog, e);
                failures += 1;
                continue;
            }
        };

        let (kind, fields) = decode_one(&opts, word);
        if fields.is_empty() {
            tracing::warn!("0x{:08x}: nothing to decode ({})", word, kind);
        }

        if opts.json {
            json_out.push(serde_json::json!({
                "word": format!("0x{:08x}", word),
                "type": kind,
                "fields": fields,
            }));
        } else {
            if many {
                println!(">> 0x{:08x}, type: {}", word, kind);
            }
            print!("{}", render_lines(&fields));
        }
    }

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&json_out)?);
    }

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
