use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::app::SimulationConfig;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[arg(long, default_value = "http://localhost:8000/analyze", help = "Analysis endpoint that accepts a multipart CSV upload")]
    pub endpoint: String,

    #[arg(long, conflicts_with = "input", help = "Transaction CSV to upload on startup")]
    pub csv: Option<PathBuf>,

    #[arg(long, help = "Previously saved analysis response to open on startup")]
    pub input: Option<PathBuf>,

    #[arg(long, default_value = ".", help = "Directory that \"Export JSON\" writes into")]
    pub export_dir: PathBuf,

    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = 100.0, help = "Rest length of transfer springs, in layout units")]
    pub link_distance: f32,

    #[arg(long, default_value_t = -200.0, allow_hyphen_values = true, help = "Many-body strength; negative values repel")]
    pub charge_strength: f32,

    #[arg(long, default_value_t = 20.0, help = "Radius of the disc each account occupies for overlap resolution")]
    pub collision_radius: f32,
}

impl Args {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            link_distance: self.link_distance.max(0.0),
            charge_strength: self.charge_strength,
            collision_radius: self.collision_radius.max(0.0),
            ..SimulationConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_layout_constants() {
        let args = Args::parse_from(["laundrograph"]);
        let config = args.simulation_config();
        assert_eq!(config.link_distance, 100.0);
        assert_eq!(config.charge_strength, -200.0);
        assert_eq!(config.collision_radius, 20.0);
        assert_eq!(args.endpoint, "http://localhost:8000/analyze");
    }

    #[test]
    fn negative_charge_is_accepted() {
        let args = Args::parse_from(["laundrograph", "--charge-strength", "-350"]);
        assert_eq!(args.simulation_config().charge_strength, -350.0);
    }

    #[test]
    fn csv_and_input_are_exclusive() {
        let parsed = Args::try_parse_from([
            "laundrograph",
            "--csv",
            "a.csv",
            "--input",
            "b.json",
        ]);
        assert!(parsed.is_err());
    }
}
