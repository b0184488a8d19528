//! `vsr` command-line entry point.
//!
//! ```text
//! vsr host-graphics args.yaml --check
//! echo '{"tag_name": "prod", "state": "absent"}' | vsr tag -
//! ```

use std::process;

use vsr_app::cli::{self, Command, Invocation};
use vsr_app::{logging, params, runner, RunOutcome};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    let cmd = match cli::parse_args(&arg_refs) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("vsr: {e}");
            eprintln!("Run 'vsr help' for usage.");
            process::exit(e.exit_code());
        }
    };

    match cmd {
        Command::Help => println!("{}", cli::USAGE),
        Command::Version => println!("vsr {}", env!("CARGO_PKG_VERSION")),
        Command::Run(inv) => process::exit(run(inv)),
    }
}

fn run(inv: Invocation) -> i32 {
    logging::init(inv.verbosity, inv.log_format);

    let outcome = match params::read_args_source(inv.args_file.as_deref()) {
        Ok(text) => match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt.block_on(runner::execute(inv.module, &text, inv.check)),
            Err(e) => RunOutcome::failure(&format!("Failed to start runtime: {e}"), None, 1),
        },
        Err(e) => RunOutcome::from_app_error(&e),
    };

    println!("{}", outcome.body);
    outcome.exit_code
}
