use crate::{
    gst::{self, GstBreakdown, GstMode},
    scores, AppState,
};
use askama::Template;
use axum::extract::{Query, State};
use serde::Deserialize;
use std::sync::Arc;

// ── Index ──────────────────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    shortener_path: String,
}

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> IndexTemplate {
    IndexTemplate {
        shortener_path: state.config.shortener_path.clone(),
    }
}

// ── GST calculator ─────────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "gst.html")]
pub struct GstTemplate {
    amount: String,
    inclusive: bool,
    rates: Vec<RateOption>,
    result: Option<GstBreakdown>,
    error: Option<String>,
}

pub struct RateOption {
    pub value: f64,
    pub selected: bool,
}

#[derive(Deserialize)]
pub struct GstQuery {
    amount: Option<String>,
    rate: Option<f64>,
    #[serde(default)]
    mode: GstMode,
}

/// GET /tools/gst
pub async fn gst_calculator(Query(query): Query<GstQuery>) -> GstTemplate {
    let rate = query.rate.unwrap_or(18.0);
    let amount = query.amount.unwrap_or_default();

    let (result, error) = if amount.trim().is_empty() {
        (None, None)
    } else {
        let parsed = amount
            .trim()
            .parse::<f64>()
            .map_err(|_| gst::GstError::InvalidAmount)
            .and_then(|a| gst::calculate(a, rate, query.mode));
        match parsed {
            Ok(b) => (Some(b), None),
            Err(e) => (None, Some(e.to_string())),
        }
    };

    GstTemplate {
        amount,
        inclusive: query.mode == GstMode::Inclusive,
        rates: gst::STANDARD_RATES
            .iter()
            .map(|&value| RateOption {
                value,
                selected: value == rate,
            })
            .collect(),
        result,
        error,
    }
}

// ── Cricket scores ─────────────────────────────────────────────────────────

pub struct MatchRow {
    pub name: String,
    pub match_type: String,
    pub teams: String,
    pub status: String,
    pub venue: String,
    pub date: String,
    pub innings: Vec<String>,
}

impl From<&scores::Match> for MatchRow {
    fn from(m: &scores::Match) -> Self {
        Self {
            name: m.name.clone(),
            match_type: m.match_type.to_uppercase(),
            teams: m.teams.join(" vs "),
            status: m.status.clone(),
            venue: m.venue.clone(),
            date: m.date.clone(),
            innings: m
                .score
                .iter()
                .map(|i| format!("{}: {}", i.inning, i.summary()))
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "cricket.html")]
pub struct CricketTemplate {
    enabled: bool,
    status: String,
    fetched_at: Option<String>,
    matches: Vec<MatchRow>,
}

#[derive(Deserialize)]
pub struct CricketQuery {
    #[serde(default)]
    status: String,
}

/// GET /tools/cricket
pub async fn cricket(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CricketQuery>,
) -> CricketTemplate {
    let snapshot = state.scores.as_ref().and_then(|poller| poller.latest());

    let (fetched_at, matches) = match &snapshot {
        Some(s) => (
            Some(s.fetched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            scores::filter_by_status(&s.matches, &query.status)
                .into_iter()
                .map(MatchRow::from)
                .collect(),
        ),
        None => (None, Vec::new()),
    };

    CricketTemplate {
        enabled: state.scores.is_some(),
        status: query.status,
        fetched_at,
        matches,
    }
}
