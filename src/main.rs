//! Benchmark entry point: policy banner, one measurement run, halt.
//!
//! Usage: `sched_bench [default|edf|llref] [timeline.csv]`
//!
//! Runs are single-shot and non-resumable; after the closing output marker
//! the process exits.

use std::{env, io, path::PathBuf, process};

use log::error;

use sched_bench::{
    config::{BenchConfig, Policy},
    harness::run_benchmark,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let policy = match args.first().map(String::as_str) {
        Some(arg) => match Policy::from_arg(arg) {
            Ok(policy) => policy,
            Err(e) => {
                error!("{e}");
                process::exit(2);
            }
        },
        None => Policy::Default,
    };

    println!("We are running {}", policy.name());

    let mut cfg = BenchConfig::for_policy(policy);
    cfg.csv_path = args.get(1).map(PathBuf::from);

    match run_benchmark(&cfg, Box::new(io::stdout())) {
        Ok(_) => process::exit(0),
        Err(e) => {
            error!("benchmark failed: {e}");
            process::exit(1);
        }
    }
}
