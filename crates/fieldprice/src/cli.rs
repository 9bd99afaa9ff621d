//! Clap CLI definitions for the `fieldprice` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// fieldprice -- formula-driven custom-field pricing.
///
/// Inspects the variables and dependencies of custom-field price formulas,
/// validates them and prices entities from an event snapshot file.
#[derive(Parser, Debug)]
#[command(
    name = "fieldprice",
    about = "Formula-driven custom-field pricing",
    long_about = "Inspects the variables and dependencies of custom-field price formulas, validates them and prices entities from an event snapshot file.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration directory (default: auto-discover .fieldprice/).
    #[arg(long, global = true, env = "FIELDPRICE_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the variables a field's formula may use.
    Vars(VarsArgs),

    /// Show the fields a formula depends on (or that depend on it).
    Deps(DepsArgs),

    /// Show the order in which formula fields are evaluated.
    Order(OrderArgs),

    /// Validate saved formulas or a candidate formula.
    Validate(ValidateArgs),

    /// Price one entity from a request file.
    Price(PriceArgs),

    /// Generate shell completion scripts.
    Completion(CompletionArgs),
}

#[derive(Args, Debug)]
pub struct VarsArgs {
    /// Event snapshot file (JSON or TOML).
    pub snapshot: PathBuf,

    /// Field id.
    pub field: u64,
}

#[derive(Args, Debug)]
pub struct DepsArgs {
    /// Event snapshot file (JSON or TOML).
    pub snapshot: PathBuf,

    /// Field id.
    pub field: u64,

    /// Show the fields whose formula references this field instead.
    #[arg(long, conflicts_with = "transitive")]
    pub reverse: bool,

    /// Include indirect dependencies, dependencies first.
    #[arg(long)]
    pub transitive: bool,
}

#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Event snapshot file (JSON or TOML).
    pub snapshot: PathBuf,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Event snapshot file (JSON or TOML).
    pub snapshot: PathBuf,

    /// Validate a candidate formula for this field instead of the saved ones.
    #[arg(long, requires = "formula")]
    pub field: Option<u64>,

    /// Candidate formula text.
    #[arg(long, requires = "field")]
    pub formula: Option<String>,

    /// Report every error instead of the first one per field.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct PriceArgs {
    /// Event snapshot file (JSON or TOML).
    pub snapshot: PathBuf,

    /// Pricing request file: entity, optional base price and answers.
    pub request: PathBuf,
}

#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[command(subcommand)]
    pub command: CompletionCommands,
}

/// Completion subcommands.
#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    /// Generate bash completions.
    Bash,
    /// Generate zsh completions.
    Zsh,
    /// Generate fish completions.
    Fish,
    /// Generate PowerShell completions.
    Powershell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn candidate_needs_both_flags() {
        let err = Cli::try_parse_from(["fieldprice", "validate", "event.json", "--field", "3"]);
        assert!(err.is_err());
        let ok = Cli::try_parse_from([
            "fieldprice",
            "validate",
            "event.json",
            "--field",
            "3",
            "--formula",
            "value * 2",
        ]);
        assert!(ok.is_ok());
    }

    #[test]
    fn reverse_and_transitive_conflict() {
        let err = Cli::try_parse_from([
            "fieldprice",
            "deps",
            "event.json",
            "1",
            "--reverse",
            "--transitive",
        ]);
        assert!(err.is_err());
    }
}
