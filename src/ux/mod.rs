use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::wire::{ChatMessage, ChatRole, CompanyProfile, ContentEntry};

pub fn show_calendar(entries: &[ContentEntry]) {
    println!("\n{}", "=== YOUR 30-DAY CONTENT PLAN ===".bold());
    if entries.is_empty() {
        println!("(no entries)");
        return;
    }
    for e in entries {
        println!(
            "{}  {}  {}",
            format!("Day {:>2}", e.day).cyan().bold(),
            e.platform.bold(),
            format!("[{}]", e.content_type).magenta()
        );
        println!("  {} {}", "Idea:".bold(), e.idea);
        println!("{}", indent(&e.caption, 2));
        if !e.hashtags.trim().is_empty() {
            println!("  {}", e.hashtags.blue());
        }
        println!();
    }
}

pub fn show_script(script: &str) {
    println!("\n{}", "=== YOUR VIDEO SCRIPT ===".bold());
    for line in script.lines() {
        let t = line.trim_start();
        if t.starts_with("**VISUAL:**") || t.starts_with("VISUAL:") {
            println!("{}", line.green());
        } else if t.starts_with("**TEXT:**") || t.starts_with("TEXT:") {
            println!("{}", line.yellow());
        } else if t.starts_with("**VO:**") || t.starts_with("VO:") {
            println!("{}", line.cyan());
        } else {
            println!("{}", line);
        }
    }
    println!();
}

pub fn show_chat_message(msg: &ChatMessage) {
    match msg.role {
        ChatRole::User => println!("{} {}", "you>".bold(), msg.content),
        ChatRole::Model => println!("{} {}", "ai>".magenta().bold(), msg.content),
    }
}

pub fn show_error(message: &str) {
    eprintln!("{}", message.red().bold());
}

pub fn show_profiles(profiles: &[CompanyProfile], selected: Option<&str>) {
    if profiles.is_empty() {
        println!("(no profiles)");
        return;
    }
    for p in profiles {
        let marker = if Some(p.id.as_str()) == selected { "*".green().bold() } else { " ".normal() };
        let niche = if p.niche.is_empty() { "(no niche)".dimmed().to_string() } else { p.niche.clone() };
        println!("{} {}  {}  {}", marker, p.id.dimmed(), p.name.bold(), niche);
    }
}

pub fn show_profile(p: &CompanyProfile) {
    println!("{} {}", "Name:".bold(), p.name);
    println!("{} {}", "Id:".bold(), p.id);
    println!("{} {}", "Niche:".bold(), p.niche);
    let links = [
        ("Instagram", &p.social_links.instagram),
        ("LinkedIn", &p.social_links.linked_in),
        ("X", &p.social_links.x),
        ("Facebook", &p.social_links.facebook),
        ("YouTube", &p.social_links.youtube),
        ("Pinterest", &p.social_links.pinterest),
    ];
    for (label, value) in links.iter().filter(|(_, v)| !v.is_empty()) {
        println!("  {}: {}", label, value);
    }
    for (label, text) in [
        ("Previous content", &p.previous_content_text),
        ("Reference", &p.reference_text),
        ("Style & voice", &p.style_text),
    ] {
        if !text.is_empty() {
            println!("{}\n{}", format!("{label}:").bold(), indent(text, 2));
        }
    }
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Read one line of feedback; `None` on EOF.
pub fn prompt_line(prompt: &str) -> Option<String> {
    print!("{} ", prompt.bold());
    let _ = io::stdout().flush();
    let mut s = String::new();
    match io::stdin().lock().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim_end_matches(['\r', '\n']).to_string()),
    }
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}

fn indent(s: &str, n: usize) -> String {
    let pad = " ".repeat(n);
    s.lines()
        .map(|l| format!("{}{}", pad, l))
        .collect::<Vec<_>>()
        .join("\n")
}
