//! Template engine for rendering the archive pages.

use minijinja::{Environment, Value};

/// Render Markdown-rich content fields to HTML.
pub fn render_markdown(content: &str) -> String {
    use pulldown_cmark::{html, Options, Parser};

    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(content, options);

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    html_output
}

/// Template engine using minijinja with embedded templates.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the archive templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_filter("markdown", |value: String| -> Value {
            Value::from_safe_string(render_markdown(&value))
        });

        let templates = [
            ("base.html", BASE_TEMPLATE),
            ("index.html", INDEX_TEMPLATE),
            ("year.html", YEAR_TEMPLATE),
            ("game.html", GAME_TEMPLATE),
            ("people.html", PEOPLE_TEMPLATE),
            ("person.html", PERSON_TEMPLATE),
            ("rules.html", RULES_TEMPLATE),
            ("imprint.html", IMPRINT_TEMPLATE),
            ("sheet.html", SHEET_TEMPLATE),
        ];

        for (name, source) in templates {
            env.add_template(name, source)
                .expect("Failed to add embedded template");
        }

        Self { env }
    }

    /// Render a page using the named template.
    pub fn render(
        &self,
        template: &str,
        context: impl serde::Serialize,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;
        tmpl.render(Value::from_serialize(&context))
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }} - {{ site.site.title }}</title>
  {% if og %}
  <meta property="og:title" content="{{ og.title }}">
  <meta property="og:site_name" content="{{ site.site.title }}">
  <meta property="og:type" content="{{ og.type | default('website') }}">
  {% if og.url %}<meta property="og:url" content="{{ og.url | safe }}">{% endif %}
  {% if og.description %}
  <meta property="og:description" content="{{ og.description }}">
  <meta name="description" content="{{ og.description }}">
  {% endif %}
  {% if og.image %}<meta property="og:image" content="{{ og.image | safe }}">{% endif %}
  {% endif %}
  <link rel="stylesheet" href="/media/app.css">
</head>
<body>
  <header class="site-header">
    <a href="/" class="brand">
      <img src="/media/{{ site.branding.logo_dark }}" alt="{{ site.site.title }}" class="brand-logo">
    </a>
    <nav class="site-nav">
      <a href="/">Home</a>
      {% if site.latest_jam %}<a href="/{{ site.latest_jam }}/">Games {{ site.latest_jam }}</a>{% endif %}
      {% if years %}
      <details class="nav-dropdown">
        <summary>Archive</summary>
        <ul>
        {% for y in years %}
          <li><a href="/{{ y }}/">{{ y }}</a></li>
        {% endfor %}
        </ul>
      </details>
      {% endif %}
      <a href="/people/">People</a>
      <a href="/rules/">Rules</a>
      {% if site.registration.active %}
      <a href="{{ site.registration.url }}" class="nav-cta">Register for {{ site.registration.next_jam }}</a>
      {% endif %}
      {% if site.voting.active %}
      <a href="{{ site.voting.url }}" class="nav-cta">Vote now</a>
      {% endif %}
    </nav>
  </header>
  <main class="main">
    {% block content %}{% endblock %}
  </main>
  <footer class="site-footer">
    <p>{{ site.site.company_name }} &middot; {{ site.site.company_address }}</p>
    <p>
      {% if site.site.email %}<a href="mailto:{{ site.site.email }}">{{ site.site.email }}</a>{% endif %}
      {% if site.social.instagram %}<a href="{{ site.social.instagram }}">Instagram</a>{% endif %}
      {% if site.social.discord %}<a href="{{ site.social.discord }}">Discord</a>{% endif %}
      {% if site.social.github %}<a href="{{ site.social.github }}">GitHub</a>{% endif %}
      <a href="/imprint/">Imprint</a>
    </p>
  </footer>
  <script src="/media/app.js"></script>
</body>
</html>"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="hero">
  {% for image in homepage.hero.images %}
  <img src="/media/{{ image }}" alt="" class="hero-image">
  {% endfor %}
</section>

<section class="about">
  {% if homepage.about.text %}
  <div class="about-text">{{ homepage.about.text | markdown }}</div>
  {% endif %}
  {% if homepage.about.image %}
  <img src="/media/{{ homepage.about.image }}" alt="" class="about-image">
  {% endif %}
  {% if homepage.about.gallery %}
  <div class="gallery">
    {% for item in homepage.about.gallery %}
    <img src="/media/{{ item.image }}" alt="{{ item.caption | default('') }}">
    {% endfor %}
  </div>
  {% endif %}
</section>

{% if homepage.video %}
<section class="video">
  <a href="{{ homepage.video.url }}">Watch the aftermovie</a>
</section>
{% endif %}

{% if homepage.sponsors.items %}
<section class="sponsors">
  <h2>{{ homepage.sponsors.title | default("Sponsors") }}</h2>
  <ul class="sponsor-list">
    {% for sponsor in homepage.sponsors.items %}
    <li>
      <a href="{{ sponsor.url | default('#') }}" rel="noopener">
        {% if sponsor.logo %}
        <img src="/media/{{ sponsor.logo }}" alt="{{ sponsor.name }}"
             {% if sponsor.width %}width="{{ sponsor.width }}"{% endif %}
             {% if sponsor.height %}height="{{ sponsor.height }}"{% endif %}>
        {% else %}{{ sponsor.name }}{% endif %}
      </a>
    </li>
    {% endfor %}
  </ul>
</section>
{% endif %}
{% endblock %}"##;

const YEAR_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="jam-year">
  <header class="jam-header">
    {% if jam and jam.logo %}
    <img src="/media/{{ jam.logo }}" alt="Game Jam {{ year }}" class="jam-logo">
    {% endif %}
    <h1>{{ jam.title if jam else year }}</h1>
    {% if jam %}
    <p class="jam-topic">Topic: <strong>{{ jam.topic }}</strong></p>
    <p class="jam-dates">{{ jam.startdate }} &ndash; {{ jam.enddate }} ({{ jam.hours }} hours)</p>
    {% endif %}
  </header>

  {% if games %}
  <ul class="game-grid">
    {% for entry in games %}
    <li class="game-card{% if entry.winner and entry.winner != "no" %} winner{% endif %}">
      <a href="/{{ year }}/{{ entry.slug }}/">
        {% if entry.headerimage %}
        <img src="/media/{{ year }}/{{ entry.headerimage }}" alt="{{ entry.name }}">
        {% endif %}
        <h2>{{ entry.name }}</h2>
      </a>
      {% if entry.team_name %}<p class="game-team">{{ entry.team_name }}</p>{% endif %}
      {% if entry.winner and entry.winner != "no" %}
      <span class="badge">Winner{% if entry.winner != "yes" %}: {{ entry.winner }}{% endif %}</span>
      {% endif %}
    </li>
    {% endfor %}
  </ul>
  {% else %}
  <p class="empty">No games have been archived for this year yet.</p>
  {% endif %}
</article>
{% endblock %}"##;

const GAME_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="game-detail">
  {% if game.headerimage %}
  <img src="/media/{{ year }}/{{ game.headerimage }}" alt="{{ game.name }}" class="game-header">
  {% endif %}

  <h1>{{ game.name }}</h1>
  {% if game.winner and game.winner != "no" %}
  <span class="badge">Winner{% if game.winner != "yes" %}: {{ game.winner }}{% endif %}</span>
  {% endif %}

  <dl class="game-facts">
    {% if game.players %}<dt>Players</dt><dd>{{ game.players }}</dd>{% endif %}
    {% if game.controls %}<dt>Controls</dt><dd>{{ game.controls | join(", ") }}</dd>{% endif %}
    {% if game.team_name %}<dt>Team</dt><dd>{{ game.team_name }}</dd>{% endif %}
  </dl>

  {% if game.members %}
  <ul class="team-members">
    {% for member in game.members %}
    <li><a href="/person/{{ member.slug }}/">{{ member.name }}</a></li>
    {% endfor %}
  </ul>
  {% endif %}

  {% if game.description %}
  <div class="game-description">{{ game.description | markdown }}</div>
  {% endif %}

  {% if game.images %}
  <div class="screenshots">
    {% for shot in game.images %}
    <a href="/media/{{ year }}/{{ shot.file }}">
      <img src="/media/{{ year }}/{{ shot.thumb | default(shot.file) }}" alt="Screenshot of {{ game.name }}">
    </a>
    {% endfor %}
  </div>
  {% endif %}

  {% if game.download %}
  <section class="downloads">
    <h2>Downloads</h2>
    <ul>
      {% for dl in game.download %}
      <li>
        {% if dl.file is startingwith("http") %}
        <a href="{{ dl.file | safe }}">{{ dl.platform | default("Download") }}</a>
        {% else %}
        <a href="/games/{{ year }}/{{ dl.file }}">{{ dl.platform | default("Download") }}</a>
        {% endif %}
      </li>
      {% endfor %}
    </ul>
  </section>
  {% endif %}

  <p><a href="/{{ year }}/">&larr; All games of {{ year }}</a></p>
</article>
{% endblock %}"##;

const PEOPLE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="people">
  <h1>People</h1>
  <p>{{ persons | length }} participants across all jams.</p>
  <table class="people-table">
    <thead>
      <tr><th>Name</th><th>Games</th><th>Years</th></tr>
    </thead>
    <tbody>
      {% for person in persons %}
      <tr>
        <td><a href="/person/{{ person.slug }}/">{{ person.name }}</a></td>
        <td>{{ person.total_games }}</td>
        <td>{{ person.years | join(", ") }}</td>
      </tr>
      {% endfor %}
    </tbody>
  </table>
</article>
{% endblock %}"##;

const PERSON_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="person">
  <h1>{{ person_name }}</h1>
  <p>{{ total_games }} game{{ "s" if total_games != 1 }} in {{ years | join(", ") }}</p>
  <ul class="credit-list">
    {% for credit in credits %}
    <li>
      <a href="/{{ credit.year }}/{{ credit.game_slug }}/">{{ credit.game_name }}</a>
      ({{ credit.year }}){% if credit.team_name %} &mdash; {{ credit.team_name }}{% endif %}
    </li>
    {% endfor %}
  </ul>
  <p><a href="/people/">&larr; All people</a></p>
</article>
{% endblock %}"##;

const RULES_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="rules">
  <h1>Rules</h1>
  {% for rule in rules %}
  <details class="rule">
    <summary>{{ rule.question }}</summary>
    <div>{{ rule.answer | markdown }}</div>
  </details>
  {% endfor %}
</article>
{% endblock %}"##;

const IMPRINT_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="imprint">
  <h1>Imprint</h1>
  <p>{{ site.site.company_name }}</p>
  <p>{{ site.site.company_address }}</p>
  {% if site.site.company_url %}<p><a href="{{ site.site.company_url }}">{{ site.site.company_url }}</a></p>{% endif %}
  {% if site.site.email %}<p><a href="mailto:{{ site.site.email }}">{{ site.site.email }}</a></p>{% endif %}
</article>
{% endblock %}"##;

// Standalone printable A4 sheet, one game per file. Paths are absolute so
// external HTML-to-PDF converters resolve images from the project tree.
const SHEET_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ game.name }}</title>
  <style>
    @page { size: A4; margin: 2cm; }
    body { font-family: sans-serif; }
    h1 { font-size: 28pt; margin-bottom: 0; }
    .team { color: #555; margin-top: 4pt; }
    .facts { margin: 12pt 0; }
    .screenshots img { width: 45%; margin: 2%; }
  </style>
</head>
<body>
  <h1>{{ game.name }}</h1>
  {% if game.team_name %}
  <p class="team">{{ game.team_name }}{% if game.members %} &mdash;
    {% for member in game.members %}{{ member.name }}{% if not loop.last %}, {% endif %}{% endfor %}
  {% endif %}</p>
  {% endif %}
  <div class="facts">
    {% if game.players %}<p>Players: {{ game.players }}</p>{% endif %}
    {% if game.controls %}<p>Controls: {{ game.controls | join(", ") }}</p>{% endif %}
  </div>
  {% if game.description %}
  <div class="description">{{ game.description | markdown }}</div>
  {% endif %}
  {% if game.images %}
  <div class="screenshots">
    {% for shot in game.images %}
    <img src="{{ media_dir | safe }}/{{ year }}/{{ shot.file }}" alt="">
    {% endfor %}
  </div>
  {% endif %}
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_context() -> serde_json::Value {
        json!({
            "title": "Test",
            "site": {
                "latest_jam": "2024",
                "site": {
                    "title": "Game Jam",
                    "company_name": "FH",
                    "company_address": "Softwarepark 11",
                    "company_url": "",
                    "email": "info@example.org",
                    "url": ""
                },
                "branding": { "logo_dark": "logo.svg", "logo_light": "logo_w.svg" },
                "social": { "instagram": "", "github": "", "discord": "" },
                "voting": { "active": false, "url": "", "deadline": "" },
                "registration": { "next_jam": "", "active": false, "url": "", "deadline": "" }
            },
            "years": [2024, 2023]
        })
    }

    #[test]
    fn renders_year_page_with_games() {
        let engine = TemplateEngine::new();

        let mut ctx = base_context();
        ctx["year"] = json!(2024);
        ctx["jam"] = json!({
            "title": "2024", "topic": "Chain Reaction",
            "startdate": "2024-01-12", "enddate": "2024-01-14",
            "hours": 36, "logo": "gamejam2024.svg"
        });
        ctx["games"] = json!([{
            "slug": "space-lizards", "name": "Space Lizards",
            "team_name": "Rocket", "winner": "1st",
            "headerimage": "space-lizards_header.webp"
        }]);

        let html = engine.render("year.html", &ctx).unwrap();

        assert!(html.contains("Chain Reaction"));
        assert!(html.contains("/2024/space-lizards/"));
        assert!(html.contains("Winner: 1st"));
    }

    #[test]
    fn year_page_tolerates_missing_jam_metadata() {
        let engine = TemplateEngine::new();

        let mut ctx = base_context();
        ctx["year"] = json!(2019);
        ctx["jam"] = json!(null);
        ctx["games"] = json!([]);

        let html = engine.render("year.html", &ctx).unwrap();

        assert!(html.contains("2019"));
        assert!(html.contains("No games have been archived"));
    }

    #[test]
    fn game_page_renders_description_members_and_downloads() {
        let engine = TemplateEngine::new();

        let mut ctx = base_context();
        ctx["year"] = json!(2024);
        ctx["game"] = json!({
            "slug": "beta", "name": "Beta",
            "description": "A game about **chains**.",
            "members": [{ "name": "Ada Lovelace", "slug": "ada-lovelace" }],
            "download": [
                { "file": "beta-Windows.zip", "platform": "Windows" },
                { "file": "https://example.itch.io/beta", "platform": "itch.io" }
            ]
        });

        let html = engine.render("game.html", &ctx).unwrap();

        assert!(html.contains("<h1>Beta</h1>"));
        assert!(html.contains("<strong>chains</strong>"));
        assert!(html.contains("/person/ada-lovelace/"));
        assert!(html.contains("/games/2024/beta-Windows.zip"));
        // External downloads link out directly
        assert!(html.contains("href=\"https://example.itch.io/beta\""));
    }

    #[test]
    fn head_carries_open_graph_meta_when_provided() {
        let engine = TemplateEngine::new();

        let mut ctx = base_context();
        ctx["year"] = json!(2024);
        ctx["jam"] = json!(null);
        ctx["games"] = json!([]);
        ctx["og"] = json!({
            "title": "Space Lizards - Game Jam 2024",
            "type": "article",
            "url": "https://example.org/2024/space-lizards/",
            "description": "A game about chains.",
            "image": "https://example.org/media/2024/space-lizards_header.webp"
        });

        let html = engine.render("year.html", &ctx).unwrap();

        assert!(html.contains("property=\"og:type\" content=\"article\""));
        assert!(html.contains("content=\"https://example.org/2024/space-lizards/\""));
        assert!(html.contains(
            "property=\"og:image\" content=\"https://example.org/media/2024/space-lizards_header.webp\""
        ));
        assert!(html.contains("name=\"description\" content=\"A game about chains.\""));
    }

    #[test]
    fn markdown_filter_renders_safe_html() {
        let engine = TemplateEngine::new();

        let mut ctx = base_context();
        ctx["rules"] = json!([{ "question": "When?", "answer": "In *January*." }]);

        let html = engine.render("rules.html", &ctx).unwrap();

        assert!(html.contains("<em>January</em>"));
    }

    #[test]
    fn sheet_is_standalone_html() {
        let engine = TemplateEngine::new();

        let ctx = json!({
            "year": 2024,
            "media_dir": "/project/_media",
            "game": {
                "name": "Beta", "team_name": "Rocket",
                "members": [{ "name": "Ada", "slug": "ada" }],
                "players": "2-4", "controls": ["keyboard"],
                "description": "Fun.",
                "images": [{ "file": "beta_image1_full.webp" }]
            }
        });

        let html = engine.render("sheet.html", &ctx).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("size: A4"));
        assert!(html.contains("/project/_media/2024/beta_image1_full.webp"));
    }
}
