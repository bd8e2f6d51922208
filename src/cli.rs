//! Command-line surface of the headless runner.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to the experiment configuration file (written with defaults
    /// when missing)
    #[arg(short, long, default_value = "ghostwalk.toml")]
    pub config: PathBuf,

    /// Directory the result CSVs are written into
    #[arg(short, long, default_value = "results")]
    pub out: PathBuf,

    /// Experiment seed, overriding the configured one
    #[arg(long)]
    pub seed: Option<u64>,

    /// Seed of the simulated participant (defaults to seed + 1)
    #[arg(long)]
    pub participant_seed: Option<u64>,

    /// Skip the comprehension quiz even when the config enables it
    #[arg(long)]
    pub no_quiz: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// The seed the run actually uses: flag, then config, then entropy.
    pub fn resolve_seed(&self, configured: Option<u64>) -> u64 {
        self.seed
            .or(configured)
            .unwrap_or_else(|| rand::random::<u64>())
    }

    pub fn resolve_participant_seed(&self, seed: u64) -> u64 {
        self.participant_seed.unwrap_or(seed.wrapping_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_a_bare_invocation() {
        let args = Args::try_parse_from(["ghostwalk"]).unwrap();
        assert_eq!(args.config, PathBuf::from("ghostwalk.toml"));
        assert_eq!(args.out, PathBuf::from("results"));
        assert_eq!(args.seed, None);
        assert!(!args.no_quiz);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn flags_parse() {
        let args = Args::try_parse_from([
            "ghostwalk",
            "--config",
            "lab.toml",
            "--out",
            "/tmp/run1",
            "--seed",
            "42",
            "--participant-seed",
            "7",
            "--no-quiz",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("lab.toml"));
        assert_eq!(args.out, PathBuf::from("/tmp/run1"));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.participant_seed, Some(7));
        assert!(args.no_quiz);
    }

    #[test]
    fn the_flag_seed_beats_the_configured_one() {
        let with_flag = Args::try_parse_from(["ghostwalk", "--seed", "5"]).unwrap();
        assert_eq!(with_flag.resolve_seed(Some(9)), 5);
        let without = Args::try_parse_from(["ghostwalk"]).unwrap();
        assert_eq!(without.resolve_seed(Some(9)), 9);
        assert_eq!(without.resolve_participant_seed(9), 10);
    }
}
