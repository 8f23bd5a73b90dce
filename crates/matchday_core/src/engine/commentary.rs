//! Commentary templates.
//!
//! Templates are compiled once into literal and placeholder segments.
//! Rendering only concatenates segments, so a player or team name that
//! contains `{player}` is printed as-is and never expanded again.

use std::collections::HashMap;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::models::{EventKind, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Minute,
    Player,
    Team,
    Opponent,
}

impl Placeholder {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "minute" => Some(Placeholder::Minute),
            "player" => Some(Placeholder::Player),
            "team" => Some(Placeholder::Team),
            "opponent" => Some(Placeholder::Opponent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Placeholder),
}

/// Values substituted into a template.
#[derive(Debug, Clone, Copy)]
pub struct CommentaryContext<'a> {
    pub minute: u16,
    pub player: &'a str,
    pub team: &'a str,
    pub opponent: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// `{{` and `}}` produce literal braces; any other brace must open or
    /// close a known placeholder.
    pub fn compile(text: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(EngineError::Config(format!(
                            "commentary template has an unclosed placeholder: {text:?}"
                        )));
                    }
                    let slot = Placeholder::parse(name.trim()).ok_or_else(|| {
                        EngineError::Config(format!(
                            "commentary template uses unknown placeholder {{{name}}}: {text:?}"
                        ))
                    })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(slot));
                }
                '}' => {
                    return Err(EngineError::Config(format!(
                        "commentary template has a stray '}}': {text:?}"
                    )));
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    pub fn render(&self, ctx: &CommentaryContext<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(Placeholder::Minute) => out.push_str(&ctx.minute.to_string()),
                Segment::Slot(Placeholder::Player) => out.push_str(ctx.player),
                Segment::Slot(Placeholder::Team) => out.push_str(ctx.team),
                Segment::Slot(Placeholder::Opponent) => out.push_str(ctx.opponent),
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommentaryBook {
    templates: HashMap<(EventKind, Outcome), Vec<Template>>,
}

impl CommentaryBook {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let raw: HashMap<EventKind, HashMap<Outcome, Vec<String>>> = serde_yaml::from_str(text)
            .map_err(|e| EngineError::Config(format!("commentary: {e}")))?;

        let mut templates = HashMap::new();
        for (kind, by_outcome) in raw {
            for (outcome, texts) in by_outcome {
                let compiled = texts
                    .iter()
                    .map(|t| Template::compile(t))
                    .collect::<Result<Vec<_>>>()?;
                if !compiled.is_empty() {
                    templates.insert((kind, outcome), compiled);
                }
            }
        }
        Ok(Self { templates })
    }

    pub fn has(&self, kind: EventKind, outcome: Outcome) -> bool {
        self.templates.contains_key(&(kind, outcome))
    }

    /// Renders the template for (kind, outcome); `variant` picks among
    /// alternatives. Missing keys get a generic line.
    pub fn render(
        &self,
        kind: EventKind,
        outcome: Outcome,
        variant: u32,
        ctx: &CommentaryContext<'_>,
    ) -> String {
        match self.templates.get(&(kind, outcome)) {
            Some(list) => list[variant as usize % list.len()].render(ctx),
            None => {
                debug!(kind = kind.code(), outcome = outcome.code(), "no commentary template");
                generic_line(kind, outcome, ctx)
            }
        }
    }

    /// (kind, outcome) pairs from `pairs` with no template.
    pub fn coverage_gaps(
        &self,
        pairs: impl IntoIterator<Item = (EventKind, Outcome)>,
    ) -> Vec<(EventKind, Outcome)> {
        pairs.into_iter().filter(|(k, o)| !self.has(*k, *o)).collect()
    }
}

fn generic_line(kind: EventKind, outcome: Outcome, ctx: &CommentaryContext<'_>) -> String {
    format!(
        "{}' {} ({}): {} - {}",
        ctx.minute,
        ctx.player,
        ctx.team,
        kind.display_name(),
        outcome.code().replace('_', " ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(player: &'a str) -> CommentaryContext<'a> {
        CommentaryContext { minute: 12, player, team: "Rovers", opponent: "United" }
    }

    #[test]
    fn test_render_placeholders() {
        let t = Template::compile("{minute}' {player} scores for {team} against {opponent}").unwrap();
        assert_eq!(t.render(&ctx("Silva")), "12' Silva scores for Rovers against United");
    }

    #[test]
    fn test_substituted_values_are_not_expanded() {
        let t = Template::compile("{player} ({team})").unwrap();
        assert_eq!(t.render(&ctx("{team}")), "{team} (Rovers)");
    }

    #[test]
    fn test_escaped_braces() {
        let t = Template::compile("{{literal}} {player}").unwrap();
        assert_eq!(t.render(&ctx("Ana")), "{literal} Ana");
    }

    #[test]
    fn test_rejects_bad_templates() {
        assert!(Template::compile("{coach} shouts").is_err());
        assert!(Template::compile("{player").is_err());
        assert!(Template::compile("score } here").is_err());
    }

    #[test]
    fn test_variant_and_fallback() {
        let yaml = "shot:\n  goal:\n    - \"A {player}\"\n    - \"B {player}\"\n";
        let book = CommentaryBook::from_yaml_str(yaml).unwrap();
        assert_eq!(book.render(EventKind::Shot, Outcome::Goal, 0, &ctx("X")), "A X");
        assert_eq!(book.render(EventKind::Shot, Outcome::Goal, 3, &ctx("X")), "B X");

        let generic = book.render(EventKind::Foul, Outcome::NoCard, 0, &ctx("Y"));
        assert_eq!(generic, "12' Y (Rovers): Foul - no card");
        assert_eq!(
            book.coverage_gaps([(EventKind::Shot, Outcome::Goal), (EventKind::Foul, Outcome::NoCard)]),
            vec![(EventKind::Foul, Outcome::NoCard)]
        );
    }
}
