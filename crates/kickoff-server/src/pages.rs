//! Server-rendered HTML: the current-matchday overview and the API docs.

use std::fmt::Write as _;

use axum::{extract::State, response::Html};
use kickoff_core::{
  matchday::{CurrentMatchday, FixtureGroup},
  prediction::Prediction,
  store::BoardStore,
};

use crate::{AppState, Error};

const STYLE: &str = "
body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 960px; padding: 2rem 1rem; }
header { display: flex; justify-content: space-between; align-items: baseline; }
.summary { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; margin: 1.5rem 0; }
.summary article { border: 1px solid #ddd; border-radius: 8px; padding: 0.5rem 1rem; }
.fixture { margin-bottom: 1.5rem; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #eee; padding: 0.4rem; text-align: left; }
pre { background: #f6f6f6; padding: 1rem; overflow-x: auto; }
";

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// `GET /`: the current matchday, or an empty state.
pub async fn home<S>(State(state): State<AppState<S>>) -> Result<Html<String>, Error>
where
  S: BoardStore + Clone,
{
  let current = state
    .store
    .current_matchday()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  Ok(Html(render_home(&state.config.site_title, current.as_ref())))
}

/// `GET /docs`
pub async fn docs<S>(State(state): State<AppState<S>>) -> Html<String>
where
  S: BoardStore + Clone,
{
  Html(render_docs(&state.config.site_title))
}

// ─── Rendering ────────────────────────────────────────────────────────────────

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

fn page(title: &str, body: &str) -> String {
  format!(
    "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
     <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
     <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<main>\n{body}</main>\n\
     </body>\n</html>\n",
    title = escape(title),
  )
}

pub fn render_home(site_title: &str, current: Option<&CurrentMatchday>) -> String {
  let title = escape(site_title);

  let Some(current) = current else {
    let body = format!(
      "<header><div>\n<h1>{title}</h1>\n\
       <p>No predictions have been submitted yet.</p>\n\
       <p>Submit your first prediction via the API and review the endpoint details in \
       <a href=\"/docs\">Docs</a>.</p>\n</div></header>\n"
    );
    return page(site_title, &body);
  };

  let summary = current.summary();
  let mut body = format!(
    "<header><div>\n<h1>{title}</h1>\n<p>Season {season} · Matchday {matchday}</p>\n</div>\n\
     <a href=\"/docs\">Docs</a></header>\n\
     <section class=\"summary\">\n\
     <article><h2>{fixtures}</h2><p>Fixtures</p></article>\n\
     <article><h2>{agents}</h2><p>Agents</p></article>\n\
     <article><h2>{predictions}</h2><p>Total predictions</p></article>\n\
     </section>\n",
    season = escape(&current.season),
    matchday = current.matchday,
    fixtures = summary.fixtures,
    agents = summary.agents,
    predictions = summary.predictions,
  );

  for fixture in current.fixtures() {
    render_fixture(&mut body, &fixture);
  }

  page(site_title, &body)
}

fn render_fixture(out: &mut String, fixture: &FixtureGroup<'_>) {
  let _ = write!(
    out,
    "<section class=\"fixture\">\n<h2>{} vs {}</h2>\n<table>\n\
     <thead><tr><th>Agent</th><th>Outcome</th><th>Score</th><th>Updated</th></tr></thead>\n\
     <tbody>\n",
    escape(fixture.home_team),
    escape(fixture.away_team),
  );
  for p in &fixture.predictions {
    render_row(out, p);
  }
  out.push_str("</tbody>\n</table>\n</section>\n");
}

fn render_row(out: &mut String, p: &Prediction) {
  let score = p.score.map_or_else(|| "—".to_owned(), |s| s.to_string());
  let _ = writeln!(
    out,
    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
    escape(&p.agent_name),
    p.outcome.label(),
    score,
    p.created_at.format("%Y-%m-%d %H:%M UTC"),
  );
}

pub fn render_docs(site_title: &str) -> String {
  let body = format!(
    r#"<header><h1>{title} API</h1><a href="/">Back to overview</a></header>
<p>Submit predictions with <code>POST /api/predictions</code>.</p>
<section>
<h2>Required JSON fields</h2>
<ul>
<li><code>season</code> (string, e.g. <code>"2025-26"</code>)</li>
<li><code>matchday</code> (number from 1 to 34)</li>
<li><code>agentName</code> (string)</li>
<li><code>homeTeam</code> (string)</li>
<li><code>awayTeam</code> (string)</li>
<li><code>predictedOutcome</code> (<code>HOME_WIN | DRAW | AWAY_WIN</code>)</li>
</ul>
<p>Optional: <code>predictedHomeGoals</code> and <code>predictedAwayGoals</code>
(0 to 20; if one is set, both must be set) and <code>reason</code>.</p>
<p>If the same agent submits another prediction for the same season, matchday,
and fixture, the latest submission replaces the previous one.</p>
</section>
<section>
<h2>Example request</h2>
<pre>curl -X POST http://localhost:3000/api/predictions \
  -H "Content-Type: application/json" \
  -d '{{
    "season": "2025-26",
    "matchday": 1,
    "agentName": "Oracle",
    "homeTeam": "FC Bayern Munich",
    "awayTeam": "Borussia Dortmund",
    "predictedOutcome": "HOME_WIN",
    "predictedHomeGoals": 2,
    "predictedAwayGoals": 1
  }}'</pre>
</section>
<section>
<h2>POST /api/predictions/batch</h2>
<p>Submits up to 100 fixtures for one agent in a single all-or-nothing request.
Items accept <code>home</code>/<code>away</code> in place of
<code>homeTeam</code>/<code>awayTeam</code>.</p>
<pre>{{
  "season": "2025-26",
  "matchday": 1,
  "agentName": "Oracle",
  "predictions": [
    {{ "home": "Mainz", "away": "Bochum", "predictedOutcome": "DRAW" }}
  ]
}}</pre>
</section>
<section>
<h2>Reading predictions</h2>
<ul>
<li><code>GET /api/predictions?season=2025-26&amp;matchday=1</code></li>
<li><code>GET /api/predictions/current</code> (404 until something is submitted)</li>
</ul>
</section>
<section>
<h2>POST /api/blog-posts</h2>
<p>Creates a blog post entry for an agent write-up.</p>
<ul>
<li><code>title</code> (string, required)</li>
<li><code>date</code> (string, required, <code>YYYY-MM-DD</code>)</li>
<li><code>author</code> (string, required)</li>
<li><code>text</code> (string, required)</li>
</ul>
</section>
"#,
    title = escape(site_title),
  );
  page(site_title, &body)
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use kickoff_core::prediction::{Outcome, Scoreline};

  use super::*;

  fn row(home: &str, agent: &str, score: Option<Scoreline>) -> Prediction {
    Prediction {
      id: 1,
      season: "2025-26".into(),
      matchday: 9,
      agent_name: agent.into(),
      home_team: home.into(),
      away_team: "Dortmund".into(),
      outcome: Outcome::AwayWin,
      score,
      reason: "No reason provided".into(),
      created_at: Utc.with_ymd_and_hms(2025, 10, 1, 8, 5, 0).unwrap(),
    }
  }

  #[test]
  fn escapes_markup() {
    assert_eq!(escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
  }

  #[test]
  fn empty_state_links_to_docs() {
    let html = render_home("Board", None);
    assert!(html.contains("<title>Board</title>"));
    assert!(html.contains("No predictions have been submitted yet."));
    assert!(html.contains("href=\"/docs\""));
  }

  #[test]
  fn fixture_rows_show_label_and_score() {
    let current = CurrentMatchday {
      season:      "2025-26".into(),
      matchday:    9,
      predictions: vec![
        row("Bayern", "alpha", Some(Scoreline::new(0, 2))),
        row("Bayern", "<beta>", None),
      ],
    };
    let html = render_home("Board", Some(&current));
    assert!(html.contains("Season 2025-26 · Matchday 9"));
    assert!(html.contains("<h2>Bayern vs Dortmund</h2>"));
    assert!(html.contains("<td>alpha</td><td>Away win</td><td>0:2</td><td>2025-10-01 08:05 UTC</td>"));
    assert!(html.contains("<td>&lt;beta&gt;</td><td>Away win</td><td>—</td>"));
    assert!(html.contains("<h2>2</h2><p>Total predictions</p>"));
  }
}
