use anyhow::{Context, Result};
use env_logger::Env;
use log::info;
use merge_decks::deck_merge_util::merge_deck_files;
use std::path::Path;
use std::{env, process};

fn print_usage(program: &str) {
    println!("Usage: {} file1.csv file2.csv file_out.csv", program);
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    // positional only: file names starting with '-' are decks, not options
    if args.len() != 4 {
        print_usage(&program);
        process::exit(1);
    }

    let deck_a = Path::new(&args[1]);
    let deck_b = Path::new(&args[2]);
    let output = Path::new(&args[3]);

    let stats = merge_deck_files(deck_a, deck_b, output).with_context(|| {
        format!(
            "failed to merge {:?} and {:?} into {:?}",
            deck_a, deck_b, output
        )
    })?;
    info!("\n{}", stats);
    Ok(())
}
