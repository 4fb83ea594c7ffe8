use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_fields;
mod cmd_fill;
mod cmd_stream;
mod common;

use cmd_fill::FillArgs;

#[derive(Parser, Debug)]
#[command(name = "xfactl", version, about = "XFA form CLI")]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List the fields defined by a form's XFA template
    Fields {
        pdf: PathBuf,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Fill a form's XFA datasets from a JSON object of field paths
    Fill {
        template: PathBuf,
        data: PathBuf,
        output: PathBuf,
        /// Mark all form fields read-only
        #[arg(long)]
        flatten: bool,
        /// Form type recorded in the document title
        #[arg(long)]
        form_type: Option<String>,
        /// Creator recorded in the document metadata
        #[arg(long)]
        creator: Option<String>,
    },
    /// Print a named XFA packet (template, datasets, ...)
    Stream { pdf: PathBuf, name: String },
}

fn main() -> Result<()> {
    let Cli { verbose, cmd } = Cli::parse();

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cmd {
        Cmd::Fields { pdf, json } => cmd_fields::run(&pdf, json)?,
        Cmd::Fill {
            template,
            data,
            output,
            flatten,
            form_type,
            creator,
        } => cmd_fill::run(FillArgs {
            template,
            data,
            output,
            flatten,
            form_type,
            creator,
        })?,
        Cmd::Stream { pdf, name } => cmd_stream::run(&pdf, &name)?,
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fields_json() {
        let cli = Cli::parse_from(["xfactl", "fields", "form.pdf", "--json"]);
        match cli.cmd {
            Cmd::Fields { pdf, json } => {
                assert_eq!(pdf, PathBuf::from("form.pdf"));
                assert!(json);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parse_fill_args() {
        let cli = Cli::parse_from([
            "xfactl",
            "-vv",
            "fill",
            "blank.pdf",
            "data.json",
            "out.pdf",
            "--flatten",
            "--form-type",
            "I-130",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.cmd {
            Cmd::Fill {
                output,
                flatten,
                form_type,
                creator,
                ..
            } => {
                assert_eq!(output, PathBuf::from("out.pdf"));
                assert!(flatten);
                assert_eq!(form_type.as_deref(), Some("I-130"));
                assert_eq!(creator, None);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn fill_requires_three_paths() {
        assert!(Cli::try_parse_from(["xfactl", "fill", "blank.pdf", "data.json"]).is_err());
    }

    #[test]
    fn parse_stream() {
        let cli = Cli::parse_from(["xfactl", "stream", "form.pdf", "datasets"]);
        match cli.cmd {
            Cmd::Stream { name, .. } => assert_eq!(name, "datasets"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
