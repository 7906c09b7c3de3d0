use anyhow::{bail, Context};
use clap::Parser;
use minilang::config::get_config;
use minilang::parser::{self, Program};
use minilang::vm::{RunResult, StackStats, VMOptions, WritePrinter};
use std::io::{BufWriter, Read};
use std::time::Duration;

/// Run a Minilang program.
#[derive(Parser, Debug)]
#[command()]
struct Args {
    /// File containing a Minilang program, `-` reads it from stdin.
    #[arg(conflicts_with = "eval", required_unless_present = "eval")]
    file: Option<String>,
    /// Program source given directly on the command line.
    #[arg(long, short = 'e', allow_hyphen_values = true)]
    eval: Option<String>,
    /// Initial value of the register.
    #[arg(long, short = 'r', default_value_t = 0, allow_negative_numbers = true)]
    register: i64,
    /// Initial stack value, bottom first. May be repeated.
    #[arg(long = "stack", allow_negative_numbers = true)]
    stack: Vec<i64>,
    /// Maximum stack size.
    #[arg(long, short = 'm')]
    max_stack_size: Option<usize>,
    /// A limit for the number of executed instructions.
    /// If the limit is reached, the program will be stopped with an error.
    #[arg(long, short = 'l')]
    op_limit: Option<u64>,
    /// Print statistics after running the program.
    #[arg(long, short = 's')]
    stats: bool,
    /// Only check that every word is a literal or a known command.
    #[arg(long)]
    check: bool,
}

fn read_program(args: &Args) -> Result<Program, anyhow::Error> {
    let source = match (&args.eval, args.file.as_deref()) {
        (Some(source), _) => source.clone(),
        (None, Some("-")) => {
            let mut source = String::new();
            std::io::stdin().lock().read_to_string(&mut source).context("Failed to read program from stdin")?;
            source
        }
        (None, Some(file)) => std::fs::read_to_string(file).with_context(|| format!("Failed to read program from {file}"))?,
        (None, None) => bail!("No program given, pass a file or --eval"),
    };
    Ok(parser::parse_program(&source))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let program = read_program(&args)?;
    if args.check {
        program.check()?;
        return Ok(());
    }

    let conf = get_config();
    let options = VMOptions::new(
        args.register,
        &args.stack,
        args.max_stack_size.unwrap_or(conf.max_stack_size),
        args.op_limit.unwrap_or(conf.op_limit),
    );
    log::debug!("Running {} tokens with {:?}", program.len(), options);

    let stdout = std::io::stdout();
    let mut printer = WritePrinter::new(BufWriter::new(stdout.lock()));

    let start_time = std::time::Instant::now();
    let result = minilang::vm::run_with_stats(&program, options, &mut printer, StackStats::default());
    let elapsed = start_time.elapsed();

    // Values printed before a failure are still part of the output.
    printer.flush().context("Failed to flush output")?;
    let result = result?;

    if args.stats {
        print_stats(&result, elapsed);
    }

    Ok(())
}

fn print_stats(result: &RunResult<StackStats>, elapsed: Duration) {
    let instructions_per_second = result.instruction_counter as f64 / elapsed.as_secs_f64();
    eprintln!("Execution time: {:?}", elapsed);
    eprintln!(
        "Instructions executed: {} ({}/s)",
        result.instruction_counter,
        match instructions_per_second {
            n if n >= 1_000_000.0 => format!("{:.1}M", n / 1_000_000.0),
            n if n >= 1_000.0 => format!("{:.1}k", n / 1_000.0),
            n => format!("{:.1}", n),
        }
    );
    eprintln!("Peak stack depth: {}", result.tracer.max_depth);
    eprintln!("Values printed: {}", result.tracer.prints);
    eprintln!("Register: {}", result.register);
    eprintln!("Stack: {:?}", result.stack);
}
