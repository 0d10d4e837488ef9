//! AI coaching layer.
//!
//! Consumes the analytics outputs and turns them into natural-language
//! coaching advice via a chat backend, plus a rule-based set of quick tips
//! that needs no model call. The coaching layer is a pure consumer of the
//! aggregates; it never touches the store or the replay API.

pub mod backend;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::info;

use crate::analytics::{PlaylistStats, RecentForm, StrengthsWeaknesses, SummaryStats};
use backend::{ChatMessage, ChatRequest, CoachBackend};

/// How many playlists the prompt mentions.
const PROMPT_PLAYLIST_LIMIT: usize = 3;

/// Errors from the coaching layer. `Unavailable` means the feature is not
/// configured (no API key); `Backend` means a configured call failed.
#[derive(Debug, Error)]
pub enum CoachError {
    #[error("Coaching unavailable: {0}")]
    Unavailable(String),

    #[error("AI backend error: {0}")]
    Backend(String),

    #[error("AI response unparseable: {0}")]
    ResponseParse(String),
}

const SYSTEM_PROMPT: &str = "You are an expert Rocket League coach with years of experience. \
Provide specific, actionable coaching advice based on player statistics. \
Be encouraging but honest. Focus on 3-4 key areas for improvement. \
Keep your response concise and well-structured.";

/// Generate personalized coaching advice from a player's aggregates.
pub async fn generate_coaching_tips(
    backend: &dyn CoachBackend,
    summary: &SummaryStats,
    recent: &RecentForm,
    strengths: &StrengthsWeaknesses,
    playlists: &BTreeMap<String, PlaylistStats>,
) -> Result<String, CoachError> {
    let prompt = build_coaching_prompt(summary, recent, strengths, playlists);

    info!("Requesting coaching advice from {}", backend.name());

    let request = ChatRequest::new(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ])
    .with_temperature(0.7)
    .with_max_tokens(800);

    let response = backend.chat(request).await?;
    Ok(response.content)
}

/// Build the user prompt sent to the coaching model.
pub fn build_coaching_prompt(
    summary: &SummaryStats,
    recent: &RecentForm,
    strengths: &StrengthsWeaknesses,
    playlists: &BTreeMap<String, PlaylistStats>,
) -> String {
    let mut prompt = format!(
        "Analyze this Rocket League player's performance and provide coaching advice:\n\
        \n\
        OVERALL STATS ({} games):\n\
        - Win Rate: {:.1}%\n\
        - Average Goals: {:.2}\n\
        - Average Assists: {:.2}\n\
        - Average Saves: {:.2}\n\
        - Average Score: {:.0}\n\
        - Shooting Accuracy: {:.1}%\n\
        \n\
        RECENT FORM (Last {} games):\n\
        - Wins: {}/{} ({:.1}% win rate)\n\
        - Recent Goals: {:.2}\n\
        - Recent Assists: {:.2}\n\
        - Recent Saves: {:.2}\n\
        \n\
        IDENTIFIED PATTERNS:\n\
        Strengths: {}\n\
        Areas to improve: {}\n",
        summary.total_games,
        summary.win_rate,
        summary.avg_goals,
        summary.avg_assists,
        summary.avg_saves,
        summary.avg_score,
        summary.avg_shooting_pct,
        recent.games,
        recent.wins,
        recent.games,
        recent.win_rate,
        recent.avg_goals,
        recent.avg_assists,
        recent.avg_saves,
        strengths.strengths.join(", "),
        strengths.weaknesses.join(", "),
    );

    if !playlists.is_empty() {
        prompt.push_str("\nPERFORMANCE BY GAME MODE:\n");
        for (playlist, stats) in playlists.iter().take(PROMPT_PLAYLIST_LIMIT) {
            prompt.push_str(&format!(
                "- {}: {} games, {:.1}% win rate\n",
                playlist, stats.games, stats.win_rate
            ));
        }
    }

    prompt.push_str(
        "\nProvide personalized coaching advice:\n\
        1. Start with 1-2 positive observations about their playstyle\n\
        2. Identify 2-3 key areas for improvement with specific actionable tips\n\
        3. Suggest training focus areas or drills\n\
        4. End with motivational insight about their trajectory\n\
        \n\
        Keep it concise, specific, and encouraging.",
    );

    prompt
}

/// Rule-based quick tips derived from summary stats alone; no model call.
/// Returns at most five tips.
pub fn quick_tips(summary: &SummaryStats) -> Vec<String> {
    let mut tips = Vec::new();

    if summary.avg_goals < 1.0 {
        tips.push("Work on offensive positioning - look for more scoring opportunities".to_string());
    } else if summary.avg_goals > 2.0 {
        tips.push("Excellent goal scoring! Keep applying offensive pressure".to_string());
    }

    if summary.avg_assists < 0.8 {
        tips.push("Practice passing plays - look for teammates in better positions".to_string());
    } else if summary.avg_assists > 1.5 {
        tips.push("Great playmaking! Your passing creates opportunities".to_string());
    }

    if summary.avg_saves < 1.0 {
        tips.push("Focus on defensive rotation and positioning".to_string());
    } else if summary.avg_saves > 2.0 {
        tips.push("Solid defense! You're keeping your team in games".to_string());
    }

    if summary.avg_shooting_pct < 30.0 {
        tips.push("Improve shot selection - quality over quantity".to_string());
    } else if summary.avg_shooting_pct > 50.0 {
        tips.push("Excellent shooting accuracy! You're efficient with your shots".to_string());
    }

    if summary.win_rate < 45.0 {
        tips.push("Focus on consistency - review replays to identify patterns".to_string());
    } else if summary.win_rate > 55.0 {
        tips.push("Great win rate! You're climbing steadily".to_string());
    }

    tips.truncate(5);
    tips
}
