//! hvd-config: resolve launcher parameters into worker environment variables
//!
//! Merges command-line flags, a config file and built-in defaults, validates
//! the result and prints the environment handed to each worker process.

use anyhow::Result;

fn main() -> Result<()> {
    hvd_config::cli::run()
}
