use anyhow::Context;
use clap::{Parser, Subcommand};
use depend_rs::depend;
use depend_rs::scenario::{Runner, ScenarioLoader};
use dotenv::dotenv;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a scenario and print the controlled elements' state after each step
    Run {
        /// Path to the scenario file
        #[arg(short, long)]
        file: String,
    },
    /// Attach a scenario's controls without replaying its steps
    Check {
        /// Path to the scenario file
        #[arg(short, long)]
        file: String,
    },
    /// List the registered rule names
    Rules,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let loader = ScenarioLoader::new();
    let runner = Runner::default();

    match args.command {
        Commands::Run { file } => {
            let scenario = loader
                .load_scenario(&file)
                .with_context(|| format!("Failed to load scenario {}", file))?;
            log::info!("Running scenario '{}' from {}", scenario.name, file);

            let report = runner.run(&scenario)?;
            print!("{}", report);
        }
        Commands::Check { file } => {
            let scenario = loader
                .load_scenario(&file)
                .with_context(|| format!("Failed to load scenario {}", file))?;
            runner.check(&scenario)?;
            println!(
                "Scenario '{}' is valid ({} controls)",
                scenario.name,
                scenario.controls.len()
            );
        }
        Commands::Rules => {
            for name in depend::registry().names() {
                println!("{}", name);
            }
        }
    }

    Ok(())
}
