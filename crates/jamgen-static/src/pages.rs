//! Page generation: turn loaded content records into renderable pages.
//!
//! Every page carries its full template context, so rendering is a pure
//! function of the page list. Routes are extensionless; the writer maps them
//! to `{route}/index.html` (and the empty route to `index.html`).

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use jamgen_data::{
    collect_people, slugify, ContentStore, DataError, GameRecord, LoadedYear, SiteConfig,
};

/// One page to be rendered and written.
#[derive(Debug, Clone)]
pub struct Page {
    /// Route without leading or trailing slash, empty for the front page
    pub route: String,
    pub template: &'static str,
    pub title: String,
    pub context: serde_json::Value,
}

/// A team member reference with a link slug.
#[derive(Debug, Clone, Serialize)]
pub struct MemberRef {
    pub name: String,
    pub slug: String,
}

/// Flattened view of a game record as the templates consume it.
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headerimage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub images: Vec<jamgen_data::Screenshot>,
    pub download: Vec<jamgen_data::Download>,
}

impl GameSummary {
    /// `None` for records without a usable name.
    pub fn from_record(record: &GameRecord) -> Option<Self> {
        let name = record.name()?.to_string();
        let slug = slugify(&name);

        let game = record.game.as_ref()?;

        let members = record
            .team
            .as_ref()
            .map(|team| {
                team.members
                    .iter()
                    .filter_map(|member| {
                        let slug = slugify(member);
                        if slug.is_empty() {
                            return None;
                        }
                        Some(MemberRef {
                            name: member.clone(),
                            slug,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            slug,
            team_name: record.team.as_ref().map(|t| t.name.clone()),
            members,
            winner: record.winner.clone(),
            headerimage: record.headerimage.clone(),
            players: game.players.as_ref().map(|p| p.to_string()),
            controls: game.controls.clone(),
            description: game.description.clone(),
            images: record.images.clone(),
            download: record.download.clone(),
            name,
        })
    }
}

/// Map a route to its output file under `output_dir`.
pub fn output_path(output_dir: &Path, route: &str) -> PathBuf {
    if route.is_empty() {
        output_dir.join("index.html")
    } else {
        output_dir.join(route).join("index.html")
    }
}

/// Generate the complete page list for the site.
///
/// Missing data files degrade gracefully: a year without games renders an
/// empty listing, and a project without any jam years yields only the static
/// pages plus a warning.
pub fn generate_pages(
    store: &mut ContentStore,
    site: &SiteConfig,
) -> Result<Vec<Page>, DataError> {
    let years = store.discover_years();
    if years.is_empty() {
        warn!("No jam years found under {}", store.paths().data_dir.display());
    }

    let mut loaded: Vec<LoadedYear> = Vec::with_capacity(years.len());
    for &year in &years {
        loaded.push(store.load_year(year)?);
    }

    // Navigation shows newest first
    let mut nav_years = years.clone();
    nav_years.reverse();

    let site_value = serde_json::to_value(site).unwrap_or_default();
    let base = |title: &str| {
        json!({
            "title": title,
            "site": &site_value,
            "years": &nav_years,
        })
    };

    let mut pages = Vec::new();

    let homepage = store.homepage()?.clone();
    let fallback_image = homepage
        .hero
        .images
        .first()
        .map(|image| media_url(site, None, image));

    let mut index_ctx = base(&site.site.title);
    index_ctx["homepage"] = flatten_homepage(&homepage);
    index_ctx["og"] = og_meta(
        &site.site.title,
        "website",
        page_url(site, ""),
        homepage.about.text.as_deref().map(og_description),
        fallback_image.clone(),
    );
    pages.push(Page {
        route: String::new(),
        template: "index.html",
        title: site.site.title.clone(),
        context: index_ctx,
    });

    for year_data in &loaded {
        let year = year_data.year;

        let mut summaries: Vec<GameSummary> = Vec::new();
        for record in &year_data.games {
            let Some(summary) = GameSummary::from_record(record) else {
                debug!("Skipping incomplete game entry in {year}");
                continue;
            };
            if summary.slug.is_empty() {
                debug!("Skipping unsluggable game name {:?} in {year}", summary.name);
                continue;
            }
            if summaries.iter().any(|s| s.slug == summary.slug) {
                warn!(
                    "Duplicate game slug {:?} in {year}; the later entry overwrites the page",
                    summary.slug
                );
            }
            summaries.push(summary);
        }

        let title = year_data
            .jam
            .as_ref()
            .map(|jam| format!("Game Jam {}", jam.title))
            .unwrap_or_else(|| format!("Game Jam {year}"));

        // The winner's header makes the best preview; any header beats none
        let year_image = summaries
            .iter()
            .find(|s| s.winner.as_deref().is_some_and(|w| w != "no"))
            .and_then(|s| s.headerimage.as_deref())
            .or_else(|| summaries.iter().find_map(|s| s.headerimage.as_deref()))
            .map(|image| media_url(site, Some(year), image))
            .or_else(|| fallback_image.clone());

        let year_description = match &year_data.jam {
            Some(jam) if !jam.topic.is_empty() => {
                format!("{title}: {}", jam.topic)
            }
            _ => format!("All games of the {year} jam."),
        };

        let mut year_ctx = base(&title);
        year_ctx["year"] = json!(year);
        year_ctx["jam"] = serde_json::to_value(&year_data.jam).unwrap_or_default();
        year_ctx["games"] = serde_json::to_value(&summaries).unwrap_or_default();
        year_ctx["og"] = og_meta(
            &title,
            "website",
            page_url(site, &year.to_string()),
            Some(year_description),
            year_image,
        );
        pages.push(Page {
            route: year.to_string(),
            template: "year.html",
            title,
            context: year_ctx,
        });

        for summary in &summaries {
            let route = format!("{year}/{}", summary.slug);
            let game_description = summary
                .description
                .as_deref()
                .map(og_description)
                .unwrap_or_else(|| {
                    format!("Play {} from the {year} game jam.", summary.name)
                });
            let game_image = summary
                .headerimage
                .as_deref()
                .map(|image| media_url(site, Some(year), image))
                .or_else(|| fallback_image.clone());

            let mut game_ctx = base(&summary.name);
            game_ctx["year"] = json!(year);
            game_ctx["game"] = serde_json::to_value(summary).unwrap_or_default();
            game_ctx["og"] = og_meta(
                &format!("{} - Game Jam {year}", summary.name),
                "article",
                page_url(site, &route),
                Some(game_description),
                game_image,
            );
            pages.push(Page {
                route,
                template: "game.html",
                title: summary.name.clone(),
                context: game_ctx,
            });
        }
    }

    let people = collect_people(&loaded);

    let mut people_ctx = base("People");
    people_ctx["persons"] = serde_json::to_value(&people).unwrap_or_default();
    people_ctx["og"] = og_meta(
        "People",
        "website",
        page_url(site, "people"),
        Some(format!(
            "The people behind the games of the {}.",
            site.site.title
        )),
        fallback_image.clone(),
    );
    pages.push(Page {
        route: "people".into(),
        template: "people.html",
        title: "People".into(),
        context: people_ctx,
    });

    for person in &people {
        let route = format!("person/{}", person.slug);
        let jams = person.years.len();
        let description = format!(
            "{} has participated in {jams} game jam{} with {} game{}.",
            person.name,
            if jams == 1 { "" } else { "s" },
            person.total_games,
            if person.total_games == 1 { "" } else { "s" },
        );

        let mut person_ctx = base(&person.name);
        person_ctx["person_name"] = json!(person.name);
        person_ctx["total_games"] = json!(person.total_games);
        person_ctx["years"] = json!(person.years);
        person_ctx["credits"] = serde_json::to_value(&person.credits).unwrap_or_default();
        person_ctx["og"] = og_meta(
            &person.name,
            "profile",
            page_url(site, &route),
            Some(description),
            fallback_image.clone(),
        );
        pages.push(Page {
            route,
            template: "person.html",
            title: person.name.clone(),
            context: person_ctx,
        });
    }

    let rules = store.rules()?.to_vec();
    let mut rules_ctx = base("Rules");
    rules_ctx["rules"] = serde_json::to_value(&rules).unwrap_or_default();
    rules_ctx["og"] = og_meta(
        "Rules",
        "website",
        page_url(site, "rules"),
        None,
        fallback_image.clone(),
    );
    pages.push(Page {
        route: "rules".into(),
        template: "rules.html",
        title: "Rules".into(),
        context: rules_ctx,
    });

    let mut imprint_ctx = base("Imprint");
    imprint_ctx["og"] = og_meta("Imprint", "website", page_url(site, "imprint"), None, None);
    pages.push(Page {
        route: "imprint".into(),
        template: "imprint.html",
        title: "Imprint".into(),
        context: imprint_ctx,
    });

    Ok(pages)
}

/// Absolute URL of a page route.
fn page_url(site: &SiteConfig, route: &str) -> String {
    let base = site.site.url.trim_end_matches('/');
    if route.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{route}/")
    }
}

/// Absolute URL of a media file, optionally under a year directory.
fn media_url(site: &SiteConfig, year: Option<u16>, file: &str) -> String {
    let base = site.site.url.trim_end_matches('/');
    let file = file.trim_start_matches('/');
    match year {
        Some(year) => format!("{base}/media/{year}/{file}"),
        None => format!("{base}/media/{file}"),
    }
}

/// Social previews want plain text: strip Markdown emphasis markers,
/// collapse whitespace, and cut long descriptions off.
fn og_description(text: &str) -> String {
    const LIMIT: usize = 200;

    let plain: String = text
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '#' | '`'))
        .collect();
    let collapsed = plain.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= LIMIT {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(LIMIT).collect();
    format!("{}...", cut.trim_end())
}

/// Open Graph values as the base template's head block consumes them.
fn og_meta(
    title: &str,
    kind: &str,
    url: String,
    description: Option<String>,
    image: Option<String>,
) -> serde_json::Value {
    let mut og = json!({
        "title": title,
        "type": kind,
        "url": url,
    });
    if let Some(description) = description {
        og["description"] = json!(description);
    }
    if let Some(image) = image {
        og["image"] = json!(image);
    }
    og
}

/// Resolve gallery items into a uniform shape for the templates.
fn flatten_homepage(homepage: &jamgen_data::Homepage) -> serde_json::Value {
    let gallery: Vec<serde_json::Value> = homepage
        .about
        .gallery
        .iter()
        .map(|item| match item {
            jamgen_data::GalleryItem::Plain(file) => json!({ "image": file }),
            jamgen_data::GalleryItem::Detailed { image, caption } => {
                json!({ "image": image, "caption": caption })
            }
        })
        .collect();

    let mut value = serde_json::to_value(homepage).unwrap_or_default();
    value["about"]["gallery"] = json!(gallery);
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use jamgen_data::ProjectPaths;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, ContentStore) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("_data/jams")).unwrap();
        fs::create_dir_all(root.join("_data/games")).unwrap();

        fs::write(
            root.join("_data/jams/2024.md"),
            "---\ntitle: \"2024\"\ntopic: \"Chain Reaction\"\nhours: 36\n---\n",
        )
        .unwrap();
        fs::write(
            root.join("_data/games/games2024.yaml"),
            concat!(
                "- game:\n",
                "    name: Space Lizards\n",
                "    description: Climb the *tower* of chains.\n",
                "  team:\n",
                "    name: Rocket\n",
                "    members:\n",
                "      - Ada Lovelace\n",
                "  winner: 1st\n",
                "  headerimage: space-lizards_header.webp\n",
                "- game:\n",
                "    name: \"!!!\"\n",
            ),
        )
        .unwrap();

        let store = ContentStore::new(ProjectPaths::new(root));
        (dir, store)
    }

    fn routes(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.route.as_str()).collect()
    }

    #[test]
    fn generates_expected_routes() {
        let (_dir, mut store) = fixture();

        let pages = generate_pages(&mut store, &SiteConfig::default()).unwrap();

        assert_eq!(
            routes(&pages),
            vec![
                "",
                "2024",
                "2024/space-lizards",
                "people",
                "person/ada-lovelace",
                "rules",
                "imprint",
            ]
        );
    }

    #[test]
    fn unsluggable_games_get_no_page() {
        let (_dir, mut store) = fixture();

        let pages = generate_pages(&mut store, &SiteConfig::default()).unwrap();

        assert!(!pages.iter().any(|p| p.route.starts_with("2024/!")));
        // The listing also drops the unsluggable entry
        let year_page = pages.iter().find(|p| p.route == "2024").unwrap();
        assert_eq!(year_page.context["games"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn empty_project_still_yields_static_pages() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ContentStore::new(ProjectPaths::new(dir.path()));

        let pages = generate_pages(&mut store, &SiteConfig::default()).unwrap();

        assert_eq!(routes(&pages), vec!["", "people", "rules", "imprint"]);
    }

    #[test]
    fn output_paths_are_pretty_urls() {
        let out = Path::new("/out");

        assert_eq!(output_path(out, ""), PathBuf::from("/out/index.html"));
        assert_eq!(
            output_path(out, "2024/space-lizards"),
            PathBuf::from("/out/2024/space-lizards/index.html")
        );
    }

    #[test]
    fn pages_carry_open_graph_previews() {
        let (_dir, mut store) = fixture();

        let pages = generate_pages(&mut store, &SiteConfig::default()).unwrap();

        let game = pages
            .iter()
            .find(|p| p.route == "2024/space-lizards")
            .unwrap();
        let og = &game.context["og"];
        assert_eq!(og["type"], serde_json::json!("article"));
        assert_eq!(
            og["url"],
            serde_json::json!("https://example.org/2024/space-lizards/")
        );
        assert_eq!(
            og["image"],
            serde_json::json!("https://example.org/media/2024/space-lizards_header.webp")
        );
        assert_eq!(
            og["description"],
            serde_json::json!("Climb the tower of chains.")
        );

        // The year preview picks the winner's header image
        let year = pages.iter().find(|p| p.route == "2024").unwrap();
        assert_eq!(
            year.context["og"]["image"],
            serde_json::json!("https://example.org/media/2024/space-lizards_header.webp")
        );

        let person = pages
            .iter()
            .find(|p| p.route == "person/ada-lovelace")
            .unwrap();
        assert_eq!(person.context["og"]["type"], serde_json::json!("profile"));
        assert_eq!(
            person.context["og"]["description"],
            serde_json::json!("Ada Lovelace has participated in 1 game jam with 1 game.")
        );
    }

    #[test]
    fn long_preview_descriptions_are_truncated() {
        let text = "chain ".repeat(60);

        let preview = og_description(&text);

        assert!(preview.ends_with("..."));
        assert!(preview.chars().count() <= 203);
    }

    #[test]
    fn nav_years_are_newest_first() {
        let (dir, _) = fixture();
        fs::write(
            dir.path().join("_data/jams/2023.md"),
            "---\ntitle: \"2023\"\ntopic: \"Time\"\nhours: 36\n---\n",
        )
        .unwrap();
        let mut store = ContentStore::new(ProjectPaths::new(dir.path()));

        let pages = generate_pages(&mut store, &SiteConfig::default()).unwrap();

        assert_eq!(pages[0].context["years"], serde_json::json!([2024, 2023]));
    }
}
