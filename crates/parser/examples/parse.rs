use std::env;
use std::process::ExitCode;

use cee_parser::diag::render;

fn main() -> ExitCode {
    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: cargo run --example parse -- <file.cee>");
        return ExitCode::from(2);
    };

    let src = std::fs::read_to_string(&path).expect("read file");
    let (file, diags) = cee_parser::parse(&src);

    if diags.is_empty() {
        println!("{file:#?}");
        return ExitCode::SUCCESS;
    }

    let lines: Vec<&str> = src.lines().collect();
    for diag in &diags {
        let line = lines.get(diag.range.from.line as usize).copied();
        eprintln!("{}", render(diag, line, |msg| msg.to_string()));
    }
    ExitCode::FAILURE
}
