use hpcdl_core::logging;

mod cli;

fn main() {
    // Initialize logging as early as possible.
    logging::init();

    // Parse CLI and run the batch; only config/input errors are fatal.
    if let Err(err) = cli::run_from_args() {
        eprintln!("hpcdl error: {:#}", err);
        std::process::exit(1);
    }
}
