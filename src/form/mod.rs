use std::path::PathBuf;

use crate::errors::{PlannerError, PlannerResult};
use crate::wire::{CompanyProfile, GenerationMode, SocialLinks};

pub const CALENDAR_INPUT_ERROR: &str = "Please provide a niche and a content source (file or text).";
pub const SCRIPT_INPUT_ERROR: &str = "Please provide a niche and a video idea.";

/// Transient, editable form state. Hydrated from a profile by copy; editing it
/// never touches the stored profile.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub mode: GenerationMode,
    pub niche: String,
    pub social_links: SocialLinks,
    pub previous_content_file: Option<PathBuf>,
    pub previous_content_text: String,
    pub reference_files: Vec<PathBuf>,
    pub reference_text: String,
    pub style_files: Vec<PathBuf>,
    pub style_text: String,
    pub video_idea: String,
    pub video_description: String,
    pub video_audience: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Calendar,
            niche: String::new(),
            social_links: SocialLinks::default(),
            previous_content_file: None,
            previous_content_text: String::new(),
            reference_files: Vec::new(),
            reference_text: String::new(),
            style_files: Vec::new(),
            style_text: String::new(),
            video_idea: String::new(),
            video_description: String::new(),
            video_audience: String::new(),
        }
    }
}

impl FormState {
    /// Minimum-required check, run before any file is read or any call is made.
    pub fn validate(&self) -> PlannerResult<()> {
        let has_niche = !self.niche.trim().is_empty();
        match self.mode {
            GenerationMode::Calendar => {
                let has_source = self.previous_content_file.is_some()
                    || !self.previous_content_text.trim().is_empty();
                if !has_niche || !has_source {
                    return Err(PlannerError::Input(CALENDAR_INPUT_ERROR.into()));
                }
            }
            GenerationMode::Script => {
                if !has_niche || self.video_idea.trim().is_empty() {
                    return Err(PlannerError::Input(SCRIPT_INPUT_ERROR.into()));
                }
            }
        }
        Ok(())
    }

    /// One-way copy of a profile's fields; non-profile inputs are reset.
    pub fn hydrate_from(&mut self, profile: &CompanyProfile) {
        self.niche = profile.niche.clone();
        self.social_links = profile.social_links.clone();
        self.previous_content_text = profile.previous_content_text.clone();
        self.reference_text = profile.reference_text.clone();
        self.style_text = profile.style_text.clone();
        self.previous_content_file = None;
        self.reference_files.clear();
        self.style_files.clear();
        self.video_idea.clear();
        self.video_description.clear();
        self.video_audience.clear();
    }

    /// Clear every profile-backed field.
    pub fn clear_profile_fields(&mut self) {
        self.niche.clear();
        self.social_links = SocialLinks::default();
        self.previous_content_text.clear();
        self.reference_text.clear();
        self.style_text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_needs_niche_and_a_source() {
        let mut f = FormState { niche: "Vegan Bakery".into(), ..Default::default() };
        assert_eq!(f.validate(), Err(PlannerError::Input(CALENDAR_INPUT_ERROR.into())));

        f.previous_content_text = "Day1: intro post".into();
        assert!(f.validate().is_ok());

        f.niche = "   ".into();
        assert!(f.validate().is_err());

        f.niche = "Vegan Bakery".into();
        f.previous_content_text.clear();
        f.previous_content_file = Some(PathBuf::from("plan.csv"));
        assert!(f.validate().is_ok());
    }

    #[test]
    fn script_needs_niche_and_idea() {
        let mut f = FormState {
            mode: GenerationMode::Script,
            niche: "Fitness".into(),
            ..Default::default()
        };
        assert_eq!(f.validate(), Err(PlannerError::Input(SCRIPT_INPUT_ERROR.into())));
        f.video_idea = "3 protein myths".into();
        assert!(f.validate().is_ok());
    }

    #[test]
    fn hydrate_copies_profile_and_resets_transient_inputs() {
        let profile = CompanyProfile {
            id: "p1".into(),
            name: "Bakery".into(),
            niche: "Vegan Bakery".into(),
            reference_text: "hooks".into(),
            ..Default::default()
        };
        let mut f = FormState {
            video_idea: "old idea".into(),
            reference_files: vec![PathBuf::from("a.txt")],
            ..Default::default()
        };
        f.hydrate_from(&profile);
        assert_eq!(f.niche, "Vegan Bakery");
        assert_eq!(f.reference_text, "hooks");
        assert!(f.reference_files.is_empty());
        assert!(f.video_idea.is_empty());
    }
}
