//! minicalc CLI and REPL
//!
//! Usage:
//!   minicalc run <file>                - Execute a minicalc file
//!   minicalc analyze [--json] <file>   - Show tokens, tree and metrics
//!   minicalc repl                      - Start interactive REPL
//!   minicalc help                      - Show help message

use std::env;
use std::fs;
use std::process;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use minicalc::interpreter::Analysis;
use minicalc::{Config, Interpreter, Value, VERSION};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("{}: missing file argument", "error".red());
                eprintln!("Usage: minicalc run <file>");
                process::exit(1);
            }
            run_file(&args[2]);
        }
        "analyze" => {
            let json = args.iter().any(|a| a == "--json");
            let Some(path) = args[2..].iter().find(|a| !a.starts_with("--")) else {
                eprintln!("{}: missing file argument", "error".red());
                eprintln!("Usage: minicalc analyze [--json] <file>");
                process::exit(1);
            };
            analyze_file(path, json);
        }
        "repl" => run_repl(),
        "help" | "--help" | "-h" => print_help(),
        "version" | "--version" | "-v" => println!("minicalc {}", VERSION),
        _ => {
            // Assume it's a file
            if args[1].ends_with(".mc") {
                run_file(&args[1]);
            } else {
                eprintln!("{}: unknown command '{}'", "error".red(), args[1]);
                print_help();
                process::exit(1);
            }
        }
    }
}

fn print_help() {
    println!("{}", "minicalc".cyan().bold());
    println!("A small expression language");
    println!("{} {}\n", "Version".cyan(), VERSION);
    println!("{}", "USAGE:".yellow());
    println!("  minicalc run <file.mc>              Execute a minicalc file");
    println!("  minicalc analyze [--json] <file.mc> Show tokens, tree and metrics");
    println!("  minicalc repl                       Start interactive REPL");
    println!("  minicalc help                       Show this help message");
    println!("  minicalc version                    Show version\n");
    println!("{}", "ENVIRONMENT:".yellow());
    println!("  MINICALC_MAX_DEPTH        Parser nesting ceiling");
    println!("  MINICALC_MAX_EVAL_DEPTH   Evaluator recursion ceiling");
    println!("  MINICALC_HISTORY_LIMIT    Runs kept in REPL history");
    println!("  RUST_LOG                  Log filter, e.g. minicalc=debug\n");
    println!("{}", "LANGUAGE:".yellow());
    println!("  var x = 10;              Declaration");
    println!("  x = x * 2                Assignment");
    println!("  (x + 1) % 3 == 0         Arithmetic, comparison");
    println!("  x > 1 && !(x > 100)      Logic");
}

fn read_source(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}: cannot read file '{}': {}", "error".red(), path, e);
            process::exit(1);
        }
    }
}

fn run_file(path: &str) {
    let source = read_source(path);
    let mut interpreter = Interpreter::with_config(Config::from_env());

    let script = interpreter.run_script(&source);
    if !script.errors.is_empty() {
        for err in &script.errors {
            eprintln!("{}", err);
        }
        process::exit(1);
    }

    if let Some(value) = script.result {
        if !value.is_null() {
            println!("{}", value);
        }
    }
}

fn analyze_file(path: &str, json: bool) {
    let source = read_source(path);
    let interpreter = Interpreter::with_config(Config::from_env());
    let analysis = interpreter.analyze(&source);

    if json {
        match serde_json::to_string_pretty(&analysis) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("{}: cannot serialize analysis: {}", "error".red(), e);
                process::exit(1);
            }
        }
    } else {
        print_analysis(&analysis);
    }

    if analysis.error.is_some() {
        process::exit(1);
    }
}

fn print_analysis(analysis: &Analysis) {
    println!("{}", "Tokens:".yellow());
    for token in &analysis.tokens {
        println!("  {}", token);
    }

    println!("{}", "Tree:".yellow());
    match (&analysis.ast_dump, &analysis.error) {
        (Some(dump), _) => {
            for line in dump.lines() {
                println!("  {}", line);
            }
        }
        (None, Some(err)) => println!("  {}", format!("{}", err).red()),
        (None, None) => {}
    }

    let m = &analysis.metrics;
    println!("{}", "Metrics:".yellow());
    println!("  tokens       {}", m.tokens);
    println!("  identifiers  {}", m.identifiers);
    println!("  operators    {}", m.operators);
    println!("  numbers      {}", m.numbers);
    println!("  complexity   {}", m.complexity);
}

fn run_repl() {
    println!("{} {} - {}",
        "minicalc".cyan().bold(),
        VERSION.cyan(),
        "a small expression language".dimmed()
    );
    println!("Type {} to exit, {} for help\n",
        "exit".yellow(),
        "help".yellow()
    );

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("{}: cannot start REPL: {}", "error".red(), e);
            process::exit(1);
        }
    };

    // One interpreter for the whole session so bindings persist across lines
    let mut interpreter = Interpreter::with_config(Config::from_env());

    loop {
        match rl.readline(&format!("{} ", "calc>".green().bold())) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Handle special commands
                match line {
                    "exit" | "quit" => {
                        println!("{}", "Goodbye!".cyan());
                        break;
                    }
                    "help" => {
                        print_repl_help();
                        continue;
                    }
                    "reset" => {
                        interpreter.reset();
                        println!("{}", "State cleared.".dimmed());
                        continue;
                    }
                    "env" => {
                        for (name, value) in interpreter.environment().snapshot() {
                            println!("  {} = {}", name, format!("{}", value).cyan());
                        }
                        continue;
                    }
                    "history" => {
                        for (i, record) in interpreter.history().iter().enumerate() {
                            println!("  {:>3}  {}  {} {:?}",
                                i + 1,
                                record.source,
                                "=>".dimmed(),
                                record.elapsed
                            );
                        }
                        continue;
                    }
                    _ => {}
                }

                if let Some(source) = line.strip_prefix(":tokens") {
                    for token in interpreter.analyze(source.trim()).tokens {
                        println!("  {}", token);
                    }
                    continue;
                }

                if let Some(source) = line.strip_prefix(":analyze") {
                    print_analysis(&interpreter.analyze(source.trim()));
                    continue;
                }

                let result = interpreter.run(line);
                match (result.result, result.error) {
                    (_, Some(err)) => eprintln!("{}", format!("{}", err).red()),
                    (Some(value), None) => {
                        if !matches!(value, Value::Null) {
                            println!("{} {}", "=>".dimmed(), format!("{}", value).cyan());
                        }
                    }
                    (None, None) => {}
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".cyan());
                break;
            }
            Err(err) => {
                eprintln!("{}: {:?}", "error".red(), err);
                break;
            }
        }
    }
}

fn print_repl_help() {
    println!("{}", "REPL Commands:".yellow());
    println!("  exit, quit       Exit the REPL");
    println!("  reset            Clear variables and run history");
    println!("  env              Show all variables");
    println!("  history          Show successful runs");
    println!("  :tokens <src>    Show the tokens of <src>");
    println!("  :analyze <src>   Show tokens, tree and metrics of <src>");
    println!("  help             Show this help\n");
    println!("{}", "Language Examples:".yellow());
    println!("  var a = 5;");
    println!("  var b = a * 2 + 1;");
    println!("  b % 3 == 2");
}
