//! Read two graphs from stdin and report whether they are isomorphic.
//!
//! ```text
//! wl-isomorphism [--matrix | --list | --edges] < graphs.txt
//! ```
//!
//! Prints `yes` and the image of each vertex on the next line, or `no`.
use std::io::Read;
use std::process::ExitCode;

use log::{debug, error};
use wl_isomorphism::format::{Format, Reader};
use wl_isomorphism::{Graph, Result, isomorphism};

/// Input format from the first command-line argument, `--<format name>`.
fn format_from_arg(arg: Option<&str>) -> std::result::Result<Format, String> {
    let Some(arg) = arg else {
        return Ok(Format::default());
    };
    arg.strip_prefix("--")
        .ok_or_else(|| format!("unknown option {arg:?}, expected --matrix, --list or --edges"))?
        .parse::<Format>()
        .map_err(|err| format!("{err}, expected --matrix, --list or --edges"))
}

/// Report a failure on the log and on stderr.
fn fail(message: &str) -> ExitCode {
    error!("{message}");
    eprintln!("{message}");
    ExitCode::FAILURE
}

fn read_pair(text: &str, format: Format) -> Result<(Graph, Graph)> {
    let mut reader = Reader::new(text);
    let a = reader.read(format)?;
    let b = reader.read(format)?;
    Ok((a, b))
}

fn main() -> ExitCode {
    env_logger::init();

    let format = match format_from_arg(std::env::args().nth(1).as_deref()) {
        Ok(format) => format,
        Err(message) => {
            fail(&message);
            return ExitCode::from(2);
        }
    };

    let mut text = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut text) {
        return fail(&format!("failed to read stdin: {err}"));
    }

    let (a, b) = match read_pair(&text, format) {
        Ok(pair) => pair,
        Err(err) => return fail(&err.to_string()),
    };
    debug!("read {format:?} graphs with {} and {} vertices", a.size(), b.size());

    match isomorphism(&a, &b) {
        Some(iso) => {
            let images: Vec<String> = iso.iter().map(usize::to_string).collect();
            println!("yes");
            println!("{}", images.join(" "));
        }
        None => println!("no"),
    }
    ExitCode::SUCCESS
}
