use drone_sim::cli::{self, Command, FormatArg};
use drone_sim::config;
use drone_sim::dispatch::PolicyKind;
use drone_sim::engine;
use drone_sim::error::Result;
use drone_sim::output::{self, Formatter, HumanFormatter, JsonFormatter, SummaryFormatter};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::parse_args()?;
    match cli.command {
        Command::Run {
            config,
            summary,
            format,
            seed,
            horizon,
        } => {
            let mut sim_config = config::load_config(&config)?;
            if let Some(seed) = seed {
                sim_config.seed = seed;
            }
            if let Some(horizon) = horizon {
                sim_config.sim_time = horizon;
            }
            let result = engine::run_simulation(&sim_config)?;

            let format = if summary { FormatArg::Summary } else { format };
            let formatter = formatter_for(format);
            print!("{}", formatter.write(&result));
        }
        Command::ShowConfig { config } => {
            let sim_config = config::load_config(&config)?;
            engine::validate_config(&sim_config)?;
            print!("{}", output::render_config(&sim_config));
        }
        Command::ListPolicies => {
            for kind in PolicyKind::ALL {
                println!("{}", kind);
            }
        }
    }

    Ok(())
}

fn formatter_for(format: FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}
