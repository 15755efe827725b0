use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead};

use brex::{ExecLimits, Pattern, demo};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Maximum executor steps per match attempt
    #[arg(long, value_name = "STEPS", global = true)]
    step_limit: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the built-in tour of the engine
    Demo,

    /// Test whether a pattern matches the whole subject
    Match {
        pattern: String,
        subject: String,

        /// Print the compiled program first
        #[arg(short, long)]
        dump: bool,
    },

    /// Print every non-overlapping match in the subject (or each stdin line)
    Find {
        pattern: String,
        subject: Option<String>,

        /// Print the compiled program first
        #[arg(short, long)]
        dump: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let limits = match args.step_limit {
        Some(steps) => ExecLimits::new().step_limit(steps),
        None => ExecLimits::new(),
    };

    match args.command {
        Command::Demo => {
            for line in demo::run()? {
                println!("{line}");
            }
        }
        Command::Match {
            pattern,
            subject,
            dump,
        } => {
            let pattern = compile(&pattern, limits, dump)?;
            match pattern.full_match(&subject) {
                Some(m) => {
                    println!("true");
                    for (index, group) in m.iter().enumerate() {
                        match group {
                            Some(text) => println!("group {index}: {text}"),
                            None => println!("group {index}: <unset>"),
                        }
                    }
                }
                None => println!("false"),
            }
        }
        Command::Find {
            pattern,
            subject,
            dump,
        } => {
            let pattern = compile(&pattern, limits, dump)?;
            match subject {
                Some(subject) => print_matches(&pattern, &subject),
                None => {
                    for line in io::stdin().lock().lines() {
                        let line = line.context("Failed to read stdin")?;
                        print_matches(&pattern, &line);
                    }
                }
            }
        }
    }
    Ok(())
}

fn compile(source: &str, limits: ExecLimits, dump: bool) -> Result<Pattern> {
    let pattern = Pattern::new(source)
        .with_context(|| format!("Invalid pattern {source:?}"))?
        .with_limits(limits);
    if dump {
        print!("{}", pattern.program());
    }
    Ok(pattern)
}

fn print_matches(pattern: &Pattern, subject: &str) {
    for m in pattern.find_all(subject) {
        println!("{}", m.as_str());
    }
}
