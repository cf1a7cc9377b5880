use calculator::{Expression, Variables};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::{
    error::Error,
    io::{BufRead, BufReader},
};

fn main() -> Result<(), Box<dyn Error>> {
    let level = match std::env::var("CALCULATOR_LOG").as_deref() {
        Ok("trace") => LevelFilter::Trace,
        Ok("debug") => LevelFilter::Debug,
        _ => LevelFilter::Warn,
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let vars = Variables::with_constants().with("test", 42.0);
    let stdin = std::io::stdin();
    let separator = "-------------------------";

    println!("{}", separator);

    for line in BufReader::new(stdin.lock()).lines() {
        let line = line?;
        if line == "q" || line == "exit" {
            break;
        }

        if let Err(e) = evaluate(&line, &vars) {
            println!("{}", e);
        }

        println!("{}", separator);
    }

    Ok(())
}

fn evaluate(line: &str, vars: &Variables) -> Result<(), Box<dyn Error>> {
    let expr: Expression = line.parse()?;
    println!("Parsed To:");
    println!("{}", expr);

    let value = expr.evaluate(vars)?;
    println!("Value: {}", value);

    Ok(())
}
