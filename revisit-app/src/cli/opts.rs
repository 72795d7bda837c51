use clap::{Args, Parser, Subcommand, ValueEnum};
use revisit_core::PhaseSchedule;
use std::path::PathBuf;

#[derive(Debug, Clone, ValueEnum)]
pub enum StoreKind {
    Json,
    /// Throwaway store, nothing survives the process
    Memory,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchedulePreset {
    Flat,
    Graduated,
}

impl SchedulePreset {
    pub fn build(self) -> PhaseSchedule {
        match self {
            SchedulePreset::Flat => PhaseSchedule::flat(),
            SchedulePreset::Graduated => PhaseSchedule::graduated(),
        }
    }
}

#[derive(Debug, Parser, Clone)]
#[command(name = "revisit", version, about = "Spaced repetition in the terminal")]
pub struct Cli {
    /// Storage backend
    #[arg(long, value_enum, default_value_t = StoreKind::Json)]
    pub store: StoreKind,

    /// JSON store file (defaults to the app data dir)
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Interval policy used for reviews and previews
    #[arg(long, value_enum, default_value_t = SchedulePreset::Flat)]
    pub schedule: SchedulePreset,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Card operations
    #[command(subcommand)]
    Card(CardCmd),
    /// Review due cards and update their schedule
    Study(SessionArgs),
    /// Drill cards without touching the schedule (unless --persist)
    Practice(PracticeArgs),
    /// Show the next interval for each answer
    Preview { card_id: String },
    /// Review totals and streak
    Stats,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    Add {
        #[arg(long)]
        front: String,
        #[arg(long)]
        back: String,
    },
    List {
        /// Only cards due now
        #[arg(long)]
        due: bool,
    },
    Rm { card_id: String },
}

#[derive(Debug, Args, Clone)]
pub struct SessionArgs {
    #[arg(long, default_value_t = 50)]
    pub max: usize,
    /// Include cards that are not due yet
    #[arg(long)]
    pub all: bool,
    /// Do not write schedule changes back
    #[arg(long)]
    pub no_persist: bool,
}

#[derive(Debug, Args, Clone)]
pub struct PracticeArgs {
    #[arg(long, default_value_t = 50)]
    pub max: usize,
    /// Random order instead of learning-first order
    #[arg(long)]
    pub shuffle: bool,
    /// Write schedule changes back
    #[arg(long)]
    pub persist: bool,
    /// Only cards that are due
    #[arg(long)]
    pub due: bool,
}
