use crate::wire::SocialLinks;

/// Everything the calendar prompt embeds.
#[derive(Debug, Clone, Copy)]
pub struct CalendarContext<'a> {
    pub niche: &'a str,
    pub social_links: &'a SocialLinks,
    pub previous_content: &'a str,
    pub reference: &'a str,
    pub style: &'a str,
}

/// Everything the video-script prompt embeds.
#[derive(Debug, Clone, Copy)]
pub struct ScriptContext<'a> {
    pub niche: &'a str,
    pub video_idea: &'a str,
    pub video_description: &'a str,
    pub video_audience: &'a str,
    pub reference: &'a str,
    pub style: &'a str,
}

fn fenced_section(label: &str, body: &str) -> String {
    format!("- **{label}:**\n```\n{body}\n```\n")
}

/// Reference material section, or nothing when there is no material.
fn brain_section(reference: &str) -> String {
    if reference.is_empty() {
        return String::new();
    }
    fenced_section(
        "Brain - Reference & Guidance (learn strategy, hooks and viral techniques from this material; it may hold file contents, raw notes or links to articles and videos)",
        reference,
    )
}

fn voice_section(style: &str) -> String {
    if style.is_empty() {
        return String::new();
    }
    fenced_section(
        "My Style & Voice - Mimicry (adopt this tone, vocabulary and personality; it may hold file contents, raw text or links to past posts)",
        style,
    )
}

fn social_links_json(links: &SocialLinks) -> String {
    serde_json::to_string_pretty(links).unwrap_or_else(|_| "{}".to_string())
}

pub fn calendar_prompt(ctx: &CalendarContext<'_>) -> String {
    format!(
"You are an expert social media strategist and content creator. Build a complete 30-day content calendar that **reads as if the user wrote it themselves**.

**Analysis Context:**
- **Niche:** {niche}
- **Social Media Presence (style reference):**
```json
{links}
```
{previous}{brain}{voice}
**Instructions:**
1. **Mimicry comes first.** Every idea and caption must sound like the user. Take vocabulary, sentence rhythm, humour and tone from the \"My Style & Voice\" section when it is present.
2. **Use the Brain.** Let the reference material shape strategy: reuse its formulas, hook patterns and viral concepts.
3. Mine the niche and the previous calendar for topics and for what performed well.
4. Produce a fresh, varied plan covering days 1 to 30.
5. Mix Reels, static Posts and Carousels, matching each format to the platform that suits it (short video for Instagram, text-led posts for LinkedIn).
6. Favour ideas that are cheap to produce but likely to drive engagement: Q&A, behind the scenes, tips, tutorials.
7. Include at least one multi-part series, such as a 3-part tutorial or a weekly theme.
8. Hashtags are one string of space-separated tags, e.g. \"#socialmedia #contentcreation #digitalmarketing\".
9. Reply with a single JSON object that matches the response schema and nothing else.",
        niche = ctx.niche,
        links = social_links_json(ctx.social_links),
        previous = fenced_section(
            "Previous Content Calendar (analyse for performance; may hold CSV/text or links to videos and documents)",
            ctx.previous_content,
        ),
        brain = brain_section(ctx.reference),
        voice = voice_section(ctx.style),
    )
}

pub fn script_prompt(ctx: &ScriptContext<'_>) -> String {
    format!(
"You are an expert viral video scriptwriter and social media strategist. Write one complete, engaging video script that **reads as if the user wrote it themselves**.

**Analysis Context:**
- **Niche:** {niche}
- **Target Audience:** {audience}
- **Core Video Idea/Prompt:** {idea}
- **Detailed Description/Key Points:** {description}
{brain}{voice}
**Instructions:**
1. **Mimicry comes first.** The script must sound like the user. Take vocabulary, sentence rhythm, humour and tone from the \"My Style & Voice\" section when it is present.
2. **Use the Brain.** Let the reference material shape structure and storytelling: reuse its formulas and viral concepts.
3. **Hook immediately.** The first 3 seconds must grab attention.
4. **Structure:** an attention-grabbing hook, a body that delivers value, information or entertainment, and a clear call to action at the end (\"Follow for more\", \"Comment your thoughts\", \"Link in bio\").
5. **Formatting:** make it easy to shoot. Mark every beat with one of:
   - **VISUAL:** [the scene]
   - **TEXT:** [on-screen text overlay]
   - **VO:** [voiceover narration]
6. Reply with a single JSON object that matches the response schema: one \"script\" key whose string value is the full script, and nothing else.",
        niche = ctx.niche,
        audience = ctx.video_audience,
        idea = ctx.video_idea,
        description = ctx.video_description,
        brain = brain_section(ctx.reference),
        voice = voice_section(ctx.style),
    )
}

/// System instruction for a refinement session over a content calendar.
pub fn calendar_refine_instruction() -> String {
    "You are an assistant refining a social media content plan. The user gives feedback on the JSON you produced earlier. \
Apply the requested changes and ALWAYS answer with the complete, updated JSON object under the key 'contentPlan'. \
Never wrap it in markdown fences and never add text outside the object: the whole reply must parse as JSON. \
If you truly need to ask a clarifying question you may answer conversationally, but returning the modified JSON is the goal."
        .to_string()
}

/// System instruction for a refinement session over a video script.
pub fn script_refine_instruction() -> String {
    "You are an assistant refining a video script. The user gives feedback on the JSON you produced earlier, which holds a single 'script' key. \
Apply the requested changes and ALWAYS answer with the complete, updated JSON object under the key 'script'. \
Never wrap it in markdown fences and never add text outside the object: the whole reply must parse as JSON."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> SocialLinks {
        SocialLinks { instagram: "instagram.com/veganbakes".into(), ..Default::default() }
    }

    #[test]
    fn calendar_prompt_is_deterministic() {
        let l = links();
        let ctx = CalendarContext {
            niche: "Vegan Bakery",
            social_links: &l,
            previous_content: "Day1: intro post",
            reference: "hooks",
            style: "warm",
        };
        let first = calendar_prompt(&ctx);
        let second = calendar_prompt(&ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_reference_and_style_leave_no_placeholder() {
        let l = links();
        let ctx = CalendarContext {
            niche: "Vegan Bakery",
            social_links: &l,
            previous_content: "Day1: intro post",
            reference: "",
            style: "",
        };
        let p = calendar_prompt(&ctx);
        assert!(!p.contains("**Brain - Reference"));
        assert!(!p.contains("**My Style & Voice - Mimicry"));
        assert!(p.contains("Day1: intro post"));
        assert!(p.contains("\"instagram\": \"instagram.com/veganbakes\""));
    }

    #[test]
    fn sections_follow_fixed_order() {
        let l = links();
        let ctx = CalendarContext {
            niche: "N",
            social_links: &l,
            previous_content: "PREV",
            reference: "REF",
            style: "STYLE",
        };
        let p = calendar_prompt(&ctx);
        let niche = p.find("**Niche:**").unwrap();
        let prev = p.find("PREV").unwrap();
        let reference = p.find("REF").unwrap();
        let style = p.find("STYLE").unwrap();
        let instructions = p.find("**Instructions:**").unwrap();
        assert!(niche < prev && prev < reference && reference < style && style < instructions);
    }

    #[test]
    fn script_prompt_lists_video_fields_and_optional_sections() {
        let ctx = ScriptContext {
            niche: "Fitness",
            video_idea: "3 protein myths",
            video_description: "keep it under 60s",
            video_audience: "beginners",
            reference: "",
            style: "dry humour",
        };
        let p = script_prompt(&ctx);
        let audience = p.find("beginners").unwrap();
        let idea = p.find("3 protein myths").unwrap();
        let desc = p.find("keep it under 60s").unwrap();
        assert!(audience < idea && idea < desc);
        assert!(p.contains("dry humour"));
        assert!(!p.contains("**Brain - Reference"));
        assert!(p.contains("\"script\" key"));
    }

    #[test]
    fn calendar_prompt_matches_golden_text() {
        let links = links();
        let ctx = CalendarContext {
            niche: "Vegan Bakery",
            social_links: &links,
            previous_content: "Day 1: Croissant reveal",
            reference: "",
            style: "Warm and cheeky.",
        };
        let expected = "You are an expert social media strategist and content creator. Build a complete 30-day content calendar that **reads as if the user wrote it themselves**.

**Analysis Context:**
- **Niche:** Vegan Bakery
- **Social Media Presence (style reference):**
```json
{
  \"instagram\": \"instagram.com/veganbakes\",
  \"linkedIn\": \"\",
  \"x\": \"\",
  \"facebook\": \"\",
  \"youtube\": \"\",
  \"pinterest\": \"\"
}
```
- **Previous Content Calendar (analyse for performance; may hold CSV/text or links to videos and documents):**
```
Day 1: Croissant reveal
```
- **My Style & Voice - Mimicry (adopt this tone, vocabulary and personality; it may hold file contents, raw text or links to past posts):**
```
Warm and cheeky.
```

**Instructions:**
1. **Mimicry comes first.** Every idea and caption must sound like the user. Take vocabulary, sentence rhythm, humour and tone from the \"My Style & Voice\" section when it is present.
2. **Use the Brain.** Let the reference material shape strategy: reuse its formulas, hook patterns and viral concepts.
3. Mine the niche and the previous calendar for topics and for what performed well.
4. Produce a fresh, varied plan covering days 1 to 30.
5. Mix Reels, static Posts and Carousels, matching each format to the platform that suits it (short video for Instagram, text-led posts for LinkedIn).
6. Favour ideas that are cheap to produce but likely to drive engagement: Q&A, behind the scenes, tips, tutorials.
7. Include at least one multi-part series, such as a 3-part tutorial or a weekly theme.
8. Hashtags are one string of space-separated tags, e.g. \"#socialmedia #contentcreation #digitalmarketing\".
9. Reply with a single JSON object that matches the response schema and nothing else.";
        assert_eq!(calendar_prompt(&ctx), expected);
    }
}
