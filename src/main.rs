use spsc_feed_bench::{
   config::USAGE,
   harness,
   shutdown::{self, ShutdownToken},
   BenchConfig, ConfigError,
};
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
   tracing_subscriber::fmt()
      .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
      .with_thread_names(true)
      .init();

   let cfg = match BenchConfig::from_args(std::env::args().skip(1)) {
      Ok(cfg) => cfg,
      Err(ConfigError::HelpRequested) => {
         println!("{USAGE}");
         return ExitCode::SUCCESS;
      }
      Err(e) => {
         eprintln!("error: {e}\n\n{USAGE}");
         return ExitCode::from(2);
      }
   };

   if let Err(e) = shutdown::install_interrupt_handler() {
      warn!("could not install SIGINT handler: {e}");
   }

   let token = ShutdownToken::new();
   match harness::run(&cfg, &token) {
      Ok(summary) => {
         println!("{summary}");
         ExitCode::SUCCESS
      }
      Err(e) => {
         error!("{e}");
         ExitCode::FAILURE
      }
   }
}
