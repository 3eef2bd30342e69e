// src/cli.rs
// =============================================================================
// Command-line interface, built with clap's derive API.
//
// The CLI plays the part of the admin panel: the global flags are the two
// plugin settings (plus where to find the site's content export), and each
// subcommand is one action the panel offers.
//
// Every setting can also come from the environment, so a cron job or CI step
// can export OHDEAR_API_TOKEN / OHDEAR_SITE_ID once and run many commands.
// =============================================================================

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::gateway::DEFAULT_MAINTENANCE_SECONDS;
use crate::ohdear::UptimeSplit;

#[derive(Parser, Debug)]
#[command(
    name = "ohdear-panel",
    version,
    about = "Manage Oh Dear monitoring for a site and trace reported problems back to its content",
    long_about = "ohdear-panel talks to the Oh Dear API for one configured site: maintenance windows, \
                  uptime and downtime, certificate health, checks, and the broken link and mixed \
                  content reports. Report rows are matched to the site's content elements so you \
                  know which page to fix."
)]
pub struct Cli {
    // The settings flags are `global` so they can go before or after the
    // subcommand: `ohdear-panel --site-id 42 sites` and `ohdear-panel sites --site-id 42`
    // Settings stay Strings here; Settings does the trimming and the rules.

    /// Oh Dear API token (60 characters)
    //
    // hide_env_values keeps the token out of --help output
    #[arg(long, env = "OHDEAR_API_TOKEN", hide_env_values = true, global = true)]
    pub api_token: Option<String>,

    /// Id of the Oh Dear site to work with
    #[arg(long, env = "OHDEAR_SITE_ID", global = true)]
    pub site_id: Option<String>,

    /// JSON export of the site's content elements, used to resolve report rows
    #[arg(long, env = "OHDEAR_CONTENT_INDEX", global = true)]
    pub content_index: Option<PathBuf>,

    /// Oh Dear API root (defaults to https://ohdear.app/api/)
    //
    // Hidden: only useful against a staging host or a local mock
    #[arg(long, env = "OHDEAR_API_URL", global = true, hide = true)]
    pub api_url: Option<String>,

    /// Output results in JSON format instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    //
    // ArgAction::Count turns repeated -v into a number
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the configured settings and list every problem
    Validate,

    /// List all sites the API token has access to
    Sites,

    /// Show the configured site and its checks
    Site,

    /// Uptime percentages between two moments
    ///
    /// Example: ohdear-panel uptime 20190901000000 20190930235959 --split day
    Uptime {
        /// Start, as YYYYMMDDHHmmss
        started_at: String,

        /// End, as YYYYMMDDHHmmss
        ended_at: String,

        /// Bucket size of the report
        //
        // value_enum lets clap list and check the allowed values (hour, day, month)
        #[arg(long, value_enum, default_value_t = UptimeSplit::Month)]
        split: UptimeSplit,
    },

    /// Downtime periods between two moments
    Downtime {
        /// Start, as YYYYMMDDHHmmss
        started_at: String,

        /// End, as YYYYMMDDHHmmss
        ended_at: String,
    },

    /// Broken links found by the crawler, with the page element that contains them
    BrokenLinks,

    /// Insecure resources on https pages, with the page element that loads them
    MixedContent,

    /// Certificate details and checks
    Certificate,

    /// Maintenance windows (no notifications while one is active)
    Maintenance {
        #[command(subcommand)]
        action: MaintenanceCommand,
    },

    /// Enable, disable or run a single check
    Check {
        #[command(subcommand)]
        action: CheckCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum MaintenanceCommand {
    /// List scheduled and past maintenance windows
    List,

    /// Schedule a maintenance window
    ///
    /// Example: ohdear-panel maintenance create "2019-09-16 10:00" "2019-09-16 11:00"
    Create {
        /// Start, as YYYY-MM-DD HH:MM
        starts_at: String,

        /// End, as YYYY-MM-DD HH:MM
        ends_at: String,
    },

    /// Delete a maintenance window
    Delete {
        /// Id of the maintenance window
        id: u64,
    },

    /// Start maintenance now
    Start {
        /// Stop maintenance automatically after this many seconds
        #[arg(long, default_value_t = DEFAULT_MAINTENANCE_SECONDS)]
        seconds: u64,
    },

    /// Stop the running maintenance window
    Stop,
}

#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Enable a check
    Enable { check_id: u64 },

    /// Disable a check
    Disable { check_id: u64 },

    /// Ask Oh Dear to run a check right away
    Run { check_id: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uptime_with_default_split() {
        let cli = Cli::try_parse_from([
            "ohdear-panel",
            "--api-token",
            "abc",
            "--site-id",
            "42",
            "uptime",
            "20190901000000",
            "20190930235959",
        ])
        .unwrap();

        assert_eq!(cli.site_id.as_deref(), Some("42"));
        match cli.command {
            Commands::Uptime { split, .. } => assert_eq!(split, UptimeSplit::Month),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_maintenance_start_default_seconds() {
        let cli = Cli::try_parse_from(["ohdear-panel", "maintenance", "start"]).unwrap();
        match cli.command {
            Commands::Maintenance {
                action: MaintenanceCommand::Start { seconds },
            } => assert_eq!(seconds, 3600),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ohdear-panel", "broken-links", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::BrokenLinks));
    }

    #[test]
    fn test_check_run_needs_an_id() {
        assert!(Cli::try_parse_from(["ohdear-panel", "check", "run"]).is_err());
        let cli = Cli::try_parse_from(["ohdear-panel", "check", "run", "7"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Check {
                action: CheckCommand::Run { check_id: 7 }
            }
        ));
    }

    #[test]
    fn test_unknown_split_is_rejected() {
        let result = Cli::try_parse_from(["ohdear-panel", "uptime", "a", "b", "--split", "year"]);
        assert!(result.is_err());
    }
}
