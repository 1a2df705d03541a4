use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use uuid::Uuid;

use content_planner::cli::{self, Command, ContextArgs, ProfileCommand, SocialArgs};
use content_planner::config::{self, Config};
use content_planner::export;
use content_planner::form::FormState;
use content_planner::generate::GenerationClient;
use content_planner::planner::{Planner, RefineOutcome, Workspace};
use content_planner::provider;
use content_planner::store::ProfileStore;
use content_planner::transcript::{self, Transcript};
use content_planner::ux;
use content_planner::wire::{CompanyProfile, GenerationMode, SocialLinks};

fn init_logging(debug: bool) {
    let filter = config::default_log_filter(debug);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

fn apply_context(form: &mut FormState, store: &mut ProfileStore, ctx: &ContextArgs) -> Result<()> {
    if let Some(key) = &ctx.profile {
        let id = store
            .find(key)
            .map(|p| p.id.clone())
            .ok_or_else(|| anyhow!("no profile with id or name {key:?}"))?;
        store.select(Some(id.as_str()), form);
    }
    if let Some(n) = &ctx.niche {
        form.niche = n.clone();
    }
    form.reference_files.extend(ctx.reference_files.iter().cloned());
    if let Some(t) = &ctx.reference_text {
        form.reference_text = t.clone();
    }
    form.style_files.extend(ctx.style_files.iter().cloned());
    if let Some(t) = &ctx.style_text {
        form.style_text = t.clone();
    }
    Ok(())
}

fn apply_social(links: &mut SocialLinks, social: &SocialArgs) {
    let pairs = [
        (&mut links.instagram, &social.instagram),
        (&mut links.linked_in, &social.linkedin),
        (&mut links.x, &social.x),
        (&mut links.facebook, &social.facebook),
        (&mut links.youtube, &social.youtube),
        (&mut links.pinterest, &social.pinterest),
    ];
    for (slot, value) in pairs {
        if let Some(v) = value {
            *slot = v.clone();
        }
    }
}

fn show_artifact(ws: &Workspace) {
    if let Some(rows) = ws.calendar() {
        ux::show_calendar(&rows);
    } else if let Some(script) = ws.script() {
        ux::show_script(script);
    }
}

fn may_overwrite(path: &Path) -> bool {
    match export::ensure_writable(path, ux::confirm) {
        Ok(()) => true,
        Err(e) => {
            ux::show_error(&format!("Skipped: {e:#}"));
            false
        }
    }
}

fn export_calendar(ws: &Workspace, path: &Path) {
    let Some(rows) = ws.calendar() else {
        ux::show_error("There is no content plan to export.");
        return;
    };
    if !may_overwrite(path) {
        return;
    }
    match export::write_csv(path, &rows) {
        Ok(n) => println!("Exported {} rows to {}", n, path.display()),
        Err(e) => ux::show_error(&format!("Export failed: {e:#}")),
    }
}

fn save_script(ws: &Workspace, path: &Path) {
    let Some(script) = ws.script() else {
        ux::show_error("There is no script to save.");
        return;
    };
    if !may_overwrite(path) {
        return;
    }
    match export::write_atomic(path, script) {
        Ok(()) => println!("Saved script to {}", path.display()),
        Err(e) => ux::show_error(&format!("Save failed: {e:#}")),
    }
}

async fn chat_loop(planner: &Planner, cfg: &Config) {
    println!("Refine with feedback. Commands: /export [path], /save <path>, /quit");
    while let Some(line) = ux::prompt_line(">") {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let message = match cli::ChatCommand::parse(line) {
            cli::ChatCommand::Quit => break,
            cli::ChatCommand::Export(path) => {
                let path = PathBuf::from(path.unwrap_or(&cfg.export_filename));
                export_calendar(&planner.snapshot(), &path);
                continue;
            }
            cli::ChatCommand::Save(None) => {
                ux::show_error("usage: /save <path>");
                continue;
            }
            cli::ChatCommand::Save(Some(path)) => {
                save_script(&planner.snapshot(), Path::new(path));
                continue;
            }
            cli::ChatCommand::Message(message) => message,
        };

        let pb = ux::spinner("Thinking...");
        let outcome = planner.refine(message).await;
        pb.finish_and_clear();

        let ws = planner.snapshot();
        if let Ok(RefineOutcome::Replaced) = outcome {
            show_artifact(&ws);
        }
        if let Some(msg) = ws.chat.last() {
            ux::show_chat_message(msg);
        }
        if let Err(e) = outcome {
            log::debug!("refine ended with {e}");
        }
    }
}

async fn run_generation(
    args: &cli::Args,
    cfg: &Config,
    form: &FormState,
    no_chat: bool,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let run = Uuid::new_v4();
    let transcript = Arc::new(Transcript::new(
        &cfg.data_dir,
        run,
        args.save_request,
        args.save_response,
        args.debug,
    ));
    if args.debug {
        transcript::print_planned_dir(transcript.dir());
    }

    let provider = provider::make_provider(cfg)?;
    let client = GenerationClient::new(provider, cfg.sampling(), args.debug).with_transcript(transcript);
    let planner = Planner::new(client);

    let pb = ux::spinner("Generating...");
    let result = planner.generate(form).await;
    pb.finish_and_clear();

    let ws = planner.snapshot();
    if let Err(e) = result {
        ux::show_error(ws.error.as_deref().unwrap_or(&e.to_string()));
        return Ok(ExitCode::FAILURE);
    }
    show_artifact(&ws);

    if let Some(path) = output {
        match form.mode {
            GenerationMode::Calendar => export_calendar(&ws, path),
            GenerationMode::Script => save_script(&ws, path),
        }
    }
    if !no_chat {
        chat_loop(&planner, cfg).await;
    }
    Ok(ExitCode::SUCCESS)
}

fn run_profile(cmd: &ProfileCommand, store: &mut ProfileStore, form: &mut FormState) -> Result<()> {
    match cmd {
        ProfileCommand::List => {
            let selected = store.selected().map(|p| p.id.clone());
            ux::show_profiles(store.profiles(), selected.as_deref());
        }
        ProfileCommand::Show { id } => {
            let p = store.find(id).ok_or_else(|| anyhow!("no profile with id or name {id:?}"))?;
            ux::show_profile(p);
        }
        ProfileCommand::Save(a) => {
            let mut profile = a
                .id
                .as_deref()
                .and_then(|id| store.get(id).cloned())
                .unwrap_or_else(|| CompanyProfile { id: a.id.clone().unwrap_or_default(), ..Default::default() });
            profile.name = a.name.clone();
            if let Some(n) = &a.niche {
                profile.niche = n.clone();
            }
            apply_social(&mut profile.social_links, &a.social);
            if let Some(t) = &a.previous_text {
                profile.previous_content_text = t.clone();
            }
            if let Some(t) = &a.reference_text {
                profile.reference_text = t.clone();
            }
            if let Some(t) = &a.style_text {
                profile.style_text = t.clone();
            }
            let saved = store.save(profile, form)?;
            println!("Saved profile {} ({})", saved.name, saved.id);
        }
        ProfileCommand::Delete { id } => {
            let id = store.find(id).map(|p| p.id.clone()).unwrap_or_else(|| id.clone());
            if store.delete(&id, form) {
                println!("Deleted profile {id}");
            } else {
                ux::show_error(&format!("No profile with id {id}"));
            }
        }
        ProfileCommand::Select { id } => {
            let id = store
                .find(id)
                .map(|p| p.id.clone())
                .ok_or_else(|| anyhow!("no profile with id or name {id:?}"))?;
            store.select(Some(id.as_str()), form);
            if !store.settings().remember_me {
                println!("Selected {id}. Enable `settings --remember-me true` to keep it across runs.");
            } else {
                println!("Selected {id}");
            }
        }
        ProfileCommand::Clear => {
            store.select(None, form);
            println!("Selection cleared");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = cli::Args::parse();
    init_logging(args.debug);

    let mut cfg = Config::load(args.config.as_deref())?;
    cfg.apply_args(&args);
    if args.debug {
        println!("debug: data dir {}", cfg.data_dir.display());
    }

    let mut store = ProfileStore::open_dir(&cfg.data_dir);
    let mut form = FormState::default();
    if store.settings().remember_me {
        if let Some(p) = store.selected().cloned() {
            form.hydrate_from(&p);
        }
    }

    match &args.command {
        Command::Calendar(c) => {
            form.mode = GenerationMode::Calendar;
            apply_context(&mut form, &mut store, &c.context)?;
            apply_social(&mut form.social_links, &c.social);
            if let Some(p) = &c.previous_file {
                form.previous_content_file = Some(p.clone());
            }
            if let Some(t) = &c.previous_text {
                form.previous_content_text = t.clone();
            }
            run_generation(&args, &cfg, &form, c.context.no_chat, c.csv.as_deref()).await
        }
        Command::Script(s) => {
            form.mode = GenerationMode::Script;
            apply_context(&mut form, &mut store, &s.context)?;
            if let Some(v) = &s.idea {
                form.video_idea = v.clone();
            }
            if let Some(v) = &s.description {
                form.video_description = v.clone();
            }
            if let Some(v) = &s.audience {
                form.video_audience = v.clone();
            }
            run_generation(&args, &cfg, &form, s.context.no_chat, s.out.as_deref()).await
        }
        Command::Profile(cmd) => {
            run_profile(cmd, &mut store, &mut form)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Settings { remember_me } => {
            store.set_remember_me(*remember_me);
            println!("remember me: {}", remember_me);
            Ok(ExitCode::SUCCESS)
        }
    }
}
