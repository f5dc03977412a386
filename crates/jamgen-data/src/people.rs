//! Person aggregation across all jam years.
//!
//! People are identified by normalized display name only. Two participants
//! sharing a name collapse into one entry; that is an accepted limitation of
//! the content model.

use std::collections::BTreeMap;

use crate::slug::slugify;
use crate::store::LoadedYear;

/// One game credit for a person.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PersonCredit {
    pub year: u16,
    pub game_name: String,
    pub game_slug: String,
    pub team_name: String,
    pub team_slug: String,
}

/// A participant, derived from team member lists. Recomputed on every build.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Person {
    pub name: String,
    pub slug: String,
    /// Number of game records crediting this name
    pub total_games: usize,
    /// Distinct years participated, ascending
    pub years: Vec<u16>,
    /// Credits sorted by year, newest first
    pub credits: Vec<PersonCredit>,
}

/// Normalize a display name for grouping: trim and collapse inner whitespace.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Aggregate all team members across the given years into one person list,
/// sorted alphabetically (case-insensitive). Names that slugify to nothing
/// are dropped.
pub fn collect_people(years: &[LoadedYear]) -> Vec<Person> {
    let mut by_name: BTreeMap<String, Vec<PersonCredit>> = BTreeMap::new();

    for loaded in years {
        for record in &loaded.games {
            let Some(game_name) = record.name() else {
                continue;
            };
            let Some(team) = record.team.as_ref() else {
                continue;
            };
            if team.members.is_empty() {
                continue;
            }

            let game_slug = slugify(game_name);
            let team_slug = slugify(&team.name);

            for member in &team.members {
                let name = normalize_name(member);
                if name.is_empty() {
                    continue;
                }

                by_name.entry(name).or_default().push(PersonCredit {
                    year: loaded.year,
                    game_name: game_name.to_string(),
                    game_slug: game_slug.clone(),
                    team_name: team.name.clone(),
                    team_slug: team_slug.clone(),
                });
            }
        }
    }

    let mut people: Vec<Person> = by_name
        .into_iter()
        .filter_map(|(name, mut credits)| {
            let slug = slugify(&name);
            if slug.is_empty() {
                return None;
            }

            credits.sort_by(|a, b| b.year.cmp(&a.year));

            let mut years: Vec<u16> = credits.iter().map(|c| c.year).collect();
            years.sort_unstable();
            years.dedup();

            Some(Person {
                total_games: credits.len(),
                name,
                slug,
                years,
                credits,
            })
        })
        .collect();

    people.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    people
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameInfo, GameRecord, TeamInfo};
    use pretty_assertions::assert_eq;

    fn game(name: &str, team: &str, members: &[&str]) -> GameRecord {
        GameRecord {
            game: Some(GameInfo {
                name: name.into(),
                players: None,
                controls: vec![],
                description: None,
            }),
            team: Some(TeamInfo {
                name: team.into(),
                members: members.iter().map(|m| m.to_string()).collect(),
            }),
            winner: None,
            headerimage: None,
            images: vec![],
            download: vec![],
        }
    }

    fn year(year: u16, games: Vec<GameRecord>) -> LoadedYear {
        LoadedYear {
            year,
            jam: None,
            games,
        }
    }

    #[test]
    fn counts_games_and_distinct_years() {
        let years = vec![
            year(2023, vec![game("Alpha", "Team A", &["Ada Lovelace"])]),
            year(
                2024,
                vec![
                    game("Beta", "Team B", &["Ada Lovelace", "Grace Hopper"]),
                    game("Gamma", "Team C", &["Ada Lovelace"]),
                ],
            ),
        ];

        let people = collect_people(&years);

        let ada = people.iter().find(|p| p.name == "Ada Lovelace").unwrap();
        assert_eq!(ada.total_games, 3);
        assert_eq!(ada.years, vec![2023, 2024]);
        // Credits newest first
        assert_eq!(ada.credits[0].year, 2024);
        assert_eq!(ada.credits.last().unwrap().year, 2023);

        let grace = people.iter().find(|p| p.name == "Grace Hopper").unwrap();
        assert_eq!(grace.total_games, 1);
        assert_eq!(grace.years, vec![2024]);
    }

    #[test]
    fn normalizes_whitespace_before_grouping() {
        let years = vec![year(
            2024,
            vec![
                game("Alpha", "A", &["  Ada   Lovelace "]),
                game("Beta", "B", &["Ada Lovelace"]),
            ],
        )];

        let people = collect_people(&years);

        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Ada Lovelace");
        assert_eq!(people[0].total_games, 2);
    }

    #[test]
    fn sorts_alphabetically_case_insensitive() {
        let years = vec![year(
            2024,
            vec![game("Alpha", "A", &["zoe", "Bert", "anna"])],
        )];

        let people = collect_people(&years);
        let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["anna", "Bert", "zoe"]);
    }

    #[test]
    fn skips_unsluggable_names_and_teamless_games() {
        let mut solo = game("Solo", "S", &[]);
        solo.team = None;

        let years = vec![year(2024, vec![game("Alpha", "A", &["!!!", "Ok Name"]), solo])];

        let people = collect_people(&years);

        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Ok Name");
    }
}
