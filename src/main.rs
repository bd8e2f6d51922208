// Entry point: loads the config, runs a simulated session end to end, and
// writes the three result CSVs.
use std::error::Error;
use std::fs;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ghostwalk::cli::Args;
use ghostwalk::config::ExperimentConfig;
use ghostwalk::report;
use ghostwalk::task::driver::ExperimentDriver;
use ghostwalk::task::quiz::Quiz;
use ghostwalk::task::session::Session;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = ExperimentConfig::load_or_init(&args.config)?;
    let seed = args.resolve_seed(config.seed);
    let participant_seed = args.resolve_participant_seed(seed);
    info!(seed, participant_seed, "seeds resolved");

    let quiz_enabled = config.quiz.enabled && !args.no_quiz;
    let must_pass = config.quiz.must_pass;

    let mut session = Session::headless(seed, participant_seed);
    let mut driver = ExperimentDriver::new(config, &mut session.rng)?;

    if quiz_enabled {
        let outcome = Quiz::new(driver.association(), must_pass).run(&mut session);
        info!(
            rounds = outcome.rounds,
            score = outcome.score,
            total = outcome.total,
            passed = outcome.passed,
            "quiz finished"
        );
    }

    driver.run(&mut session);

    fs::create_dir_all(&args.out)?;
    let results_path = args.out.join("results.csv");
    fs::write(&results_path, report::results_csv(driver.records()))?;
    fs::write(
        args.out.join("random_walk.csv"),
        report::random_walk_csv(driver.walk()),
    )?;
    fs::write(
        args.out.join("association.csv"),
        report::association_csv(driver.association()),
    )?;

    println!(
        "{} records written to {}",
        driver.records().len(),
        results_path.display()
    );
    Ok(())
}
