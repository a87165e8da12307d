//! Capability lister
//! Scrapes source and sink capabilities of a USB PD object and shows the encoded PDOs

use anyhow::Context;
use std::env;
use tracing_subscriber::{prelude::*, EnvFilter};
use usbpd_rs::caps::{scan_pd_object, summary, CapabilityEntry};
use usbpd_rs::codec::{render_lines, AvsConvention};

#[derive(Debug)]
struct Options {
    verbose: u8,
    json: bool,
    avs: AvsConvention,
    pd_dir: String,
}

fn parse_args(args: &[String]) -> anyhow::Result<Options> {
    let mut verbose = 0u8;
    let mut json = false;
    let mut avs = AvsConvention::Epr;
    let mut pd_dir = None;

    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = verbose.saturating_add(1),
            "-j" | "--json" => json = true,
            "--spr" => avs = AvsConvention::Spr,
            "--epr" => avs = AvsConvention::Epr,
            s if s.starts_with('-') => anyhow::bail!("Unknown option: {}", s),
            s if pd_dir.is_none() => pd_dir = Some(s.to_string()),
            s => anyhow::bail!("Unexpected argument: {}", s),
        }
    }

    Ok(Options {
        verbose,
        json,
        avs,
        pd_dir: pd_dir.context("Missing PD_DIR")?,
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

fn print_entries(title: &str, entries: &[CapabilityEntry], avs: AvsConvention) {
    if entries.is_empty() {
        println!("> {}: <none>", title);
        return;
    }
    println!("> {}:", title);
    for entry in entries {
        let line = summary(entry);
        if line.is_empty() {
            println!("  >> {}, type: {}", entry.name, entry.variant);
        } else {
            println!("  >> {}; {}", entry.name, line);
        }
        println!("        raw_pdo: 0x{:08x}", entry.raw);
        for field in render_lines(&entry.decode(avs)).lines() {
            println!("          {}", field);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let opts = match parse_args(&args) {
        Ok(opts) => opts,
        Err(e) => {
            let prog = args.first().map(String::as_str).unwrap_or("pd-caps");
            eprintln!("{}: {}\n", prog, e);
            eprintln!("Usage: {} [-v] [--json] [--spr] PD_DIR", prog);
            eprintln!("Example: {} /sys/class/usb_power_delivery/pd0", prog);
            std::process::exit(1);
        }
    };
    init_tracing(opts.verbose)?;

    tracing::info!("Scanning {}", opts.pd_dir);
    let caps = scan_pd_object(&opts.pd_dir, opts.avs)
        .with_context(|| format!("Failed to scan {}", opts.pd_dir))?;

    if opts.json {
        let render = |entries: &[CapabilityEntry]| -> Vec<serde_json::Value> {
            entries
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "name": e.name,
                        "index": e.index,
                        "type": e.variant,
                        "summary": summary(e),
                        "raw_pdo": format!("0x{:08x}", e.raw),
                        "attributes": e.attrs,
                        "fields": e.decode(opts.avs),
                    })
                })
                .collect()
        };
        let out = serde_json::json!({
            "source_capabilities": render(&caps.source),
            "sink_capabilities": render(&caps.sink),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_entries("source capabilities", &caps.source, opts.avs);
        print_entries("sink capabilities", &caps.sink, opts.avs);
    }

    Ok(())
}
