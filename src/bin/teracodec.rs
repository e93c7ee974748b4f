//! Command-line front end for the TERA codec library.
//!
//! Three subcommands: `check` validates a definitions directory and prints
//! diagnostics, `encode`/`decode` convert between a JSON record and a framed
//! buffer on disk. This binary is pure ambient convenience — every property the
//! codec guarantees is tested against the library directly, not through here.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tera_codec::schema::{Identifier, Version};
use tera_codec::Value;

#[derive(Parser)]
#[command(name = "teracodec", about = "Encode and decode TERA protocol messages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a definitions directory and report every diagnostic.
    Check { defs_dir: PathBuf },
    /// Encode a JSON record into a framed message.
    Encode {
        defs_dir: PathBuf,
        name: String,
        #[arg(long)]
        version: Option<u32>,
        json_file: PathBuf,
    },
    /// Decode a framed message into a JSON record.
    Decode {
        defs_dir: PathBuf,
        name: String,
        #[arg(long)]
        version: Option<u32>,
        frame_file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Check { defs_dir } => run_check(&defs_dir),
        Command::Encode { defs_dir, name, version, json_file } => run_encode(&defs_dir, &name, version, &json_file),
        Command::Decode { defs_dir, name, version, frame_file } => run_decode(&defs_dir, &name, version, &frame_file),
    }
}

fn run_check(defs_dir: &PathBuf) -> Result<()> {
    let (registry, diagnostics) = tera_codec::load_dir(defs_dir).context("loading definitions")?;
    for d in &diagnostics {
        eprintln!("warning: {d}");
    }
    if diagnostics.iter().any(|d| d.message.contains("no opcode mapping")) {
        return Err(anyhow!("one or more schemas have no opcode mapping"));
    }
    let _ = registry;
    Ok(())
}

fn run_encode(defs_dir: &PathBuf, name: &str, version: Option<u32>, json_file: &PathBuf) -> Result<()> {
    let (registry, _) = tera_codec::load_dir(defs_dir).context("loading definitions")?;
    let text = std::fs::read_to_string(json_file).context("reading json record")?;
    let json: serde_json::Value = serde_json::from_str(&text).context("parsing json record")?;
    let data = json_to_value(&json);
    let version = version.map(Version::Exact).unwrap_or(Version::Latest);
    let frame = tera_codec::write_frame(&registry, Identifier::Name(name), version, &data)
        .map_err(|e| anyhow!("{e}"))?;
    use std::io::Write;
    std::io::stdout().write_all(&frame)?;
    Ok(())
}

fn run_decode(defs_dir: &PathBuf, name: &str, version: Option<u32>, frame_file: &PathBuf) -> Result<()> {
    let (registry, _) = tera_codec::load_dir(defs_dir).context("loading definitions")?;
    let buffer = std::fs::read(frame_file).context("reading frame")?;
    let version = version.map(Version::Exact).unwrap_or(Version::Latest);
    let (value, diagnostics) =
        tera_codec::parse_frame(&registry, Identifier::Name(name), version, &buffer).map_err(|e| anyhow!("{e}"))?;
    for d in &diagnostics {
        eprintln!("warning: {d}");
    }
    println!("{}", serde_json::to_string_pretty(&value_to_json(&value))?);
    Ok(())
}

fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::empty_object(),
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Value::I64(n.as_i64().unwrap_or_else(|| n.as_f64().unwrap_or(0.0) as i64))
            } else {
                Value::F64(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => {
            let mut out = BTreeMap::new();
            for (k, v) in map {
                out.insert(k.clone(), json_to_value(v));
            }
            Value::Object(out)
        }
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Byte(v) => serde_json::Value::from(*v),
        Value::I16(v) => serde_json::Value::from(*v),
        Value::U16(v) => serde_json::Value::from(*v),
        Value::I32(v) => serde_json::Value::from(*v),
        Value::U32(v) => serde_json::Value::from(*v),
        Value::I64(v) => serde_json::Value::from(*v),
        Value::U64(v) => serde_json::Value::from(*v),
        Value::F32(v) => serde_json::Value::from(*v as f64),
        Value::F64(v) => serde_json::Value::from(*v),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(b) => serde_json::Value::Array(b.iter().map(|x| serde_json::Value::from(*x)).collect()),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k.clone(), value_to_json(v));
            }
            serde_json::Value::Object(out)
        }
        Value::Array(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
    }
}
