use chrono::Utc;
use fs_err as fs;
use serde_json::{json, to_string_pretty};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::wire::ModelRequest;

pub struct SavedPaths {
    pub dir: PathBuf,
    pub request: Option<PathBuf>,
    pub response: Option<PathBuf>,
}

/// Per-run dump of every model request and raw reply, for diagnostics.
pub struct Transcript {
    dir: PathBuf,
    save_request: bool,
    save_response: bool,
    debug: bool,
    seq: AtomicUsize,
}

pub fn run_dir(data_dir: &Path, run: Uuid) -> PathBuf {
    data_dir.join("runs").join(run.to_string())
}

impl Transcript {
    pub fn new(data_dir: &Path, run: Uuid, save_request: bool, save_response: bool, debug: bool) -> Self {
        Self {
            dir: run_dir(data_dir, run),
            save_request,
            save_response,
            debug,
            seq: AtomicUsize::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_stage(&self, stage: &str, req: &ModelRequest, response: &str) -> anyhow::Result<SavedPaths> {
        let mut request_path = None;
        let mut response_path = None;
        if !self.save_request && !self.save_response {
            return Ok(SavedPaths { dir: self.dir.clone(), request: None, response: None });
        }

        fs::create_dir_all(&self.dir)?;
        let n = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let stem = format!("{n:03}-{stage}");

        if self.save_request {
            let p = self.dir.join(format!("{stem}.request.json"));
            fs::write(&p, to_string_pretty(req)?)?;
            request_path = Some(p);
        }

        if self.save_response {
            let p = self.dir.join(format!("{stem}.response.json"));
            let body = json!({ "stage": stage, "receivedAt": Utc::now(), "text": response });
            fs::write(&p, to_string_pretty(&body)?)?;
            response_path = Some(p);
        }

        Ok(SavedPaths { dir: self.dir.clone(), request: request_path, response: response_path })
    }

    /// Best-effort save; failures are logged, never surfaced.
    pub fn record(&self, stage: &str, req: &ModelRequest, response: &str) {
        match self.save_stage(stage, req, response) {
            Ok(saved) if self.debug => print_saved_paths(stage, &saved),
            Ok(_) => {}
            Err(e) => log::warn!("could not save {stage} transcript: {e:#}"),
        }
    }
}

pub fn print_planned_dir(dir: &Path) {
    println!("debug: run artifacts directory: {}", dir.display());
    std::io::stdout().flush().ok();
}

pub fn print_saved_paths(stage: &str, saved: &SavedPaths) {
    println!("debug[{stage}]: artifacts directory: {}", saved.dir.display());
    if let Some(p) = &saved.request {
        println!("debug[{stage}]: request saved at: {}", p.display());
    } else {
        println!("debug[{stage}]: request not saved (flag off)");
    }
    if let Some(p) = &saved.response {
        println!("debug[{stage}]: response saved at: {}", p.display());
    } else {
        println!("debug[{stage}]: response not saved (flag off)");
    }
    std::io::stdout().flush().ok();
}
