extern crate getopts;

use anyhow::{Context, Result};
use env_logger::Env;
use getopts::Options;
use log::info;
use merge_decks::deck_merge_util::merge_deck_list;
use std::path::PathBuf;
use std::{env, process};

fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} -i DECK [-i DECK ...] -o OUTPUT", program);
    print!("{}", opts.usage(&brief));
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optmulti("i", "input", "sorted deck to fold, in order (repeatable)", "DECK");
    opts.optopt("o", "output", "merged deck", "OUTPUT");
    opts.optflag("h", "help", "print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            eprintln!("{}", f);
            print_usage(&program, &opts);
            process::exit(1);
        }
    };
    if matches.opt_present("h") {
        print_usage(&program, &opts);
        return Ok(());
    }

    let decks: Vec<PathBuf> = matches.opt_strs("i").into_iter().map(PathBuf::from).collect();
    let output = match matches.opt_str("o") {
        Some(o) if !decks.is_empty() => PathBuf::from(o),
        _ => {
            print_usage(&program, &opts);
            process::exit(1);
        }
    };

    info!("folding {} decks into {:?}", decks.len(), output);
    let stats = merge_deck_list(&decks, &output)
        .with_context(|| format!("failed to fold {} decks into {:?}", decks.len(), output))?;
    info!("last fold step:\n{}", stats);
    Ok(())
}
