use std::fmt;

use chrono::{DateTime, TimeZone};

use crate::thread::{UpsetThread, UpsetThreadItem};

const BOLD_UPSET_FACTOR: i32 = 4;
const LINE_BREAK: &str = "  \n";

pub fn ordinal(n: i32) -> String {
    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// `Winner (chars) (seed N) score Loser (chars) (seed M)[, out at Kth] [- Upset Factor U]`
pub fn line_item(item: &UpsetThreadItem) -> String {
    let mut words = vec![item.winners_name.clone()];
    if !item.winners_characters.is_empty() {
        words.push(format!("({})", item.winners_characters));
    }
    words.push(format!("(seed {})", item.winners_seed));
    if let Some(score) = item.score.as_ref() {
        words.push(score.clone());
    }
    words.push(item.losers_name.clone());
    if !item.losers_characters.is_empty() {
        words.push(format!("({})", item.losers_characters));
    }
    let losers_seed = format!("(seed {})", item.losers_seed);
    if item.is_winners_bracket {
        words.push(losers_seed);
    } else {
        words.push(format!("{losers_seed}, out at {}", ordinal(item.losers_placement)));
    }
    if item.upset_factor > 0 {
        words.push(format!("- Upset Factor {}", item.upset_factor));
    }
    let text = words.join(" ");
    if item.upset_factor >= BOLD_UPSET_FACTOR {
        format!("**{text}**")
    } else {
        text
    }
}

pub fn dq_line_item(item: &UpsetThreadItem) -> String {
    item.losers_name.clone()
}

fn section(items: &[UpsetThreadItem], line: fn(&UpsetThreadItem) -> String) -> String {
    items.iter().map(line).collect::<Vec<_>>().join(LINE_BREAK)
}

pub fn bracket_url(slug: &str) -> String {
    format!("https://start.gg/{slug}")
}

pub fn to_markdown<Tz: TimeZone>(thread: &UpsetThread, updated_at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!(
        "[Bracket]({})\n\n# Winners\n{}\n\n# Losers\n{}\n\n# Notables\n{}\n\n# DQs\n{}\n\n*Last updated at: {}*\n",
        bracket_url(&thread.slug),
        section(&thread.winners, line_item),
        section(&thread.losers, line_item),
        section(&thread.notables, line_item),
        section(&thread.dqs, dq_line_item),
        updated_at.format("%m/%d/%Y %I:%M%P %Z"),
    )
}
