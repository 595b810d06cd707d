// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command line arguments.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Scenario file to open at launch
    pub file: Option<PathBuf>,

    /// Location of the autosave slot
    #[arg(long, value_name = "PATH")]
    pub autosave: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_and_flags() {
        let args = Args::parse_from(["scenarist", "-vv", "--autosave", "/tmp/a.scen", "story.scen"]);
        assert_eq!(args.file, Some(PathBuf::from("story.scen")));
        assert_eq!(args.autosave, Some(PathBuf::from("/tmp/a.scen")));
        assert_eq!(args.log_filter(), "trace");
    }

    #[test]
    fn test_no_arguments() {
        let args = Args::parse_from(["scenarist"]);
        assert!(args.file.is_none());
        assert_eq!(args.log_filter(), "info");
    }
}
