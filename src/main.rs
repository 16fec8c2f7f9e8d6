use std::process;

use clap::Parser;
use log::debug;
use lpd_check::{Analyzer, SimpleBuffer, TokenKind, TokenStream};

const EXIT_USAGE: i32 = 1;
const EXIT_ANALYSIS: i32 = 2;

/// A syntax checker for LPD programs
#[derive(Parser)]
#[clap(version, author)]
struct Args {
    /// LPD source file
    input: String,
    /// Print the token stream instead of checking the syntax
    #[clap(short, long)]
    tokens: bool,
}

fn main() {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version also end up here
            let code = if e.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let buffer = match SimpleBuffer::from_file(&args.input) {
        Ok(buffer) => buffer,
        Err(e) => {
            eprintln!("Failed to read \"{}\": {}.", args.input, e);
            process::exit(EXIT_USAGE);
        }
    };
    debug!("loaded {}", args.input);

    let ts = TokenStream::new(buffer);
    let code = if args.tokens {
        dump_tokens(ts)
    } else {
        check(ts)
    };

    process::exit(code);
}

fn check(ts: TokenStream<SimpleBuffer>) -> i32 {
    match Analyzer::new(ts).check() {
        Ok(report) => {
            println!(
                "OK: syntax analysis completed for program '{}'.",
                report.program
            );
            0
        },
        Err(e) => {
            eprintln!("{}", e);
            EXIT_ANALYSIS
        }
    }
}

fn dump_tokens(mut ts: TokenStream<SimpleBuffer>) -> i32 {
    loop {
        match ts.next() {
            Ok(token) => {
                println!("{} {} \"{}\"", token.pos, token.kind, token.lexeme);
                if token.kind == TokenKind::EOF {
                    return 0;
                }
            },
            Err(e) => {
                eprintln!("{}", e);
                return EXIT_ANALYSIS;
            }
        }
    }
}
