use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "google")]
    Gemini,
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
}

#[derive(Parser, Debug)]
#[command(name = "content_planner", version, about = "LLM-backed content calendar and video script planner")]
pub struct Args {
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    /// Where profiles, settings and run transcripts live.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long, default_value_t = false)]
    pub save_request: bool,

    #[arg(long, default_value_t = false)]
    pub save_response: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a 30-day content calendar.
    Calendar(CalendarArgs),
    /// Generate a single video script.
    Script(ScriptArgs),
    /// Manage saved company profiles.
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Persisted settings.
    Settings {
        #[arg(long, action = clap::ArgAction::Set)]
        remember_me: bool,
    },
}

/// Context inputs shared by both generation modes.
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct ContextArgs {
    /// Profile id or name to hydrate the form from.
    #[arg(long)]
    pub profile: Option<String>,

    #[arg(long)]
    pub niche: Option<String>,

    #[arg(long = "reference-file")]
    pub reference_files: Vec<PathBuf>,

    #[arg(long)]
    pub reference_text: Option<String>,

    #[arg(long = "style-file")]
    pub style_files: Vec<PathBuf>,

    #[arg(long)]
    pub style_text: Option<String>,

    /// Skip the interactive refinement loop.
    #[arg(long, default_value_t = false)]
    pub no_chat: bool,
}

#[derive(ClapArgs, Debug, Default, Clone)]
pub struct SocialArgs {
    #[arg(long)]
    pub instagram: Option<String>,
    #[arg(long)]
    pub linkedin: Option<String>,
    #[arg(long)]
    pub x: Option<String>,
    #[arg(long)]
    pub facebook: Option<String>,
    #[arg(long)]
    pub youtube: Option<String>,
    #[arg(long)]
    pub pinterest: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct CalendarArgs {
    #[command(flatten)]
    pub context: ContextArgs,

    #[command(flatten)]
    pub social: SocialArgs,

    #[arg(long)]
    pub previous_file: Option<PathBuf>,

    #[arg(long)]
    pub previous_text: Option<String>,

    /// Write the calendar as CSV once generation succeeds.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct ScriptArgs {
    #[command(flatten)]
    pub context: ContextArgs,

    #[arg(long)]
    pub idea: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub audience: Option<String>,

    /// Write the script to this file once generation succeeds.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    List,
    Show { id: String },
    Save(ProfileSaveArgs),
    Delete { id: String },
    Select { id: String },
    /// Clear the current selection.
    Clear,
}

#[derive(ClapArgs, Debug)]
pub struct ProfileSaveArgs {
    /// Existing id to replace; a new id is minted when omitted.
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub niche: Option<String>,

    #[command(flatten)]
    pub social: SocialArgs,

    #[arg(long)]
    pub previous_text: Option<String>,

    #[arg(long)]
    pub reference_text: Option<String>,

    #[arg(long)]
    pub style_text: Option<String>,
}

/// A line typed into the refine loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    Quit,
    Export(Option<&'a str>),
    Save(Option<&'a str>),
    Message(&'a str),
}

impl<'a> ChatCommand<'a> {
    /// Commands match on the whole first word; anything else is feedback for the model.
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then_some(rest);
        match head {
            "/quit" if arg.is_none() => ChatCommand::Quit,
            "/export" => ChatCommand::Export(arg),
            "/save" => ChatCommand::Save(arg),
            _ => ChatCommand::Message(line),
        }
    }
}
