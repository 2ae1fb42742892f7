use super::chart::{bar_chart, donut_chart, line_chart, radial_chart};
use super::document::{group, text, BigNumber, Block, DataTable, Document, Group, Page};
use super::html::markdown_literal;
use crate::aggregate::{
    contributor_totals, language_percentages, language_rank, language_totals, log_bytes, sort_descending,
    top_languages,
};
use crate::error::Result;
use crate::model::{LanguageBytes, LanguageShare, ProjectInsights, RepositoryTable, UserProfile, Visibility};

pub const DASHBOARD_TITLE: &str = "GitHub dashboard";

pub struct DashboardInput<'a> {
    pub profile: &'a UserProfile,
    pub repositories: &'a RepositoryTable,
    pub projects: &'a [ProjectInsights],
    pub highlight_language: &'a str,
}

/// The three-page dashboard: highlights, languages, repositories.
///
/// Fails if `highlight_language` does not occur in any repository.
pub fn dashboard(input: &DashboardInput<'_>) -> Result<Document> {
    Ok(Document::new(
        format!("{}: {}", DASHBOARD_TITLE, input.profile.login),
        vec![
            highlights_page(input.profile, input.repositories),
            languages_page(input.profile, input.repositories, input.highlight_language)?,
            repositories_page(input.repositories, input.projects),
        ],
    ))
}

/// Most-starred table on its own.
pub fn repository_table(table: &RepositoryTable) -> Document {
    Document::single("User repositories", vec![most_starred_table(table)])
}

/// Language bar and donut charts on their own.
pub fn language_plots(table: &RepositoryTable) -> Document {
    let totals = user_totals(table);
    let sorted = sort_descending(language_percentages(&totals));
    Document::single("Languages", vec![language_charts(&totals, &sorted)])
}

fn user_totals(table: &RepositoryTable) -> LanguageBytes {
    language_totals(table.iter().map(|r| &r.languages))
}

fn highlights_page(profile: &UserProfile, table: &RepositoryTable) -> Page {
    let stars = table.total_stars();
    let private = profile
        .private_repos
        .unwrap_or_else(|| table.count_visibility(Visibility::Private) as u64);
    let total = profile.public_repos + private;

    let summary = format!(
        "The GitHub account **{login}** has a total of *{total} repositories*, *{public}* of which are *public*. \
         In terms of engagement, the user received *{stars} stars* and currently has *{followers} followers*. \
         Also, the account follows *{following} other people* and participates in \
         *{orgs} public organizations*.",
        login = profile.login,
        public = profile.public_repos,
        followers = profile.followers,
        following = profile.following,
        orgs = profile.organizations,
    );

    let mut identity = vec![group(
        vec![
            Block::BigNumber(BigNumber::new("Name", profile.name.as_deref().unwrap_or(&profile.login))),
            Block::BigNumber(BigNumber::new("Login", &profile.login)),
        ],
        2,
    )];
    if let Some(avatar) = &profile.avatar_url {
        identity.push(text(format!("![]({avatar})")));
    }

    let about = vec![
        profile_field("bio", profile.bio.as_deref()),
        profile_field("company", profile.company.as_deref()),
        profile_field("blog", profile.blog.as_deref()),
        Block::Divider,
        group(
            vec![
                Block::Group(Group::new(
                    vec![
                        text("### Repos"),
                        Block::BigNumber(BigNumber::new("Public", profile.public_repos)),
                        Block::BigNumber(BigNumber::new("Private", private)),
                    ],
                    1,
                )),
                Block::Group(Group::new(
                    vec![
                        text("### Engagement"),
                        Block::BigNumber(BigNumber::new("Followers", profile.followers)),
                        Block::BigNumber(BigNumber::new("Stars", stars)),
                    ],
                    1,
                )),
            ],
            2,
        ),
    ];

    Page::new(
        "Highlights",
        vec![
            text("# User data"),
            text("This tab contains some highlights of the user's data and activity."),
            text(summary),
            group(vec![group(identity, 1), group(about, 1)], 2),
            Block::Divider,
        ],
    )
}

fn profile_field(name: &str, value: Option<&str>) -> Block {
    text(format!("**{name}**: {}", markdown_literal(value.unwrap_or("-"))))
}

fn language_charts(totals: &LanguageBytes, sorted: &[LanguageShare]) -> Block {
    group(
        vec![
            Block::Chart(bar_chart(&log_bytes(totals), "language", "log bytes")),
            Block::Chart(donut_chart(sorted)),
        ],
        2,
    )
}

fn languages_page(profile: &UserProfile, table: &RepositoryTable, highlight: &str) -> Result<Page> {
    let totals = user_totals(table);
    let sorted = sort_descending(language_percentages(&totals));
    let rank = language_rank(&sorted, &totals, highlight)?;
    let top = top_languages(&sorted, 3);

    let mut narrative = leader_sentence(top);
    narrative.push_str(
        " However, GitHub also tracks automatically generated code (not written by the user). ",
    );
    narrative.push_str(&format!(
        "{} comes {} with {} bytes of code",
        markdown_literal(&rank.language),
        ordinal(rank.position + 1),
        rank.bytes
    ));
    match &rank.next {
        Some(next) => narrative.push_str(&format!(", followed by {}.", markdown_literal(next))),
        None => narrative.push('.'),
    }

    let callouts = top
        .iter()
        .map(|s| Block::BigNumber(BigNumber::new(&s.language, format_percent(s.fraction))))
        .collect();

    Ok(Page::new(
        "Languages",
        vec![
            text("# Programming languages"),
            text(format!(
                "Here is a summary of the languages involved in **{}**'s repositories. On the left, \
                 the (log) number of bytes for each programming language. On the right, their percentages \
                 over the total amount of code present in the user's repositories.",
                profile.login
            )),
            language_charts(&totals, &sorted),
            text(format!("## Top {}", top.len())),
            text(narrative),
            group(callouts, top.len()),
        ],
    ))
}

fn leader_sentence(top: &[LanguageShare]) -> String {
    let names: Vec<String> = top.iter().map(|s| format!("*{}*", markdown_literal(&s.language))).collect();
    match names.as_slice() {
        [] => "No language data is available.".to_string(),
        [only] => format!("The only language present is {only}."),
        [first, second] => format!("The most present language is {first}, followed by {second}."),
        [first, rest @ .., last] => format!(
            "The most present language is {first}, followed by {} and {last}.",
            rest.join(", ")
        ),
    }
}

fn repositories_page(table: &RepositoryTable, projects: &[ProjectInsights]) -> Page {
    let mut blocks = vec![
        text("# Collaborative contributions"),
        text(
            "The top section reports user specified contributions to collaborative projects \
             (see drop-down menu for options), with a donut chart for the programming languages adopted, \
             plus line and radial plots illustrating the contributions in terms of commits for each collaborator.",
        ),
    ];
    if projects.is_empty() {
        blocks.push(text("*No collaborative projects configured.*"));
    } else {
        blocks.push(Block::Select(projects.iter().map(project_section).collect()));
    }
    blocks.extend([
        Block::Divider,
        text("# Most starred"),
        text("Table of the user's repositories, most starred first."),
        most_starred_table(table),
    ]);
    Page::new("Repositories", blocks)
}

fn project_section(project: &ProjectInsights) -> Group {
    Group::new(
        vec![
            Block::Chart(donut_chart(&project.languages)),
            Block::Chart(line_chart(&project.activity, project.window.as_ref())),
            Block::Chart(radial_chart(&contributor_totals(&project.activity))),
        ],
        3,
    )
    .labeled(&project.full_name)
}

fn most_starred_table(table: &RepositoryTable) -> Block {
    let columns = [
        "repository",
        "languages",
        "topics",
        "description",
        "commits",
        "collaborators",
        "forks",
        "stargazers",
        "open_issues",
        "visibility",
        "license",
    ];
    let rows = table
        .most_starred()
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                r.languages
                    .iter()
                    .map(|(l, b)| format!("{l}: {b}"))
                    .collect::<Vec<_>>()
                    .join(", "),
                r.topics.join(", "),
                r.description.clone().unwrap_or_default(),
                r.commit_count.to_string(),
                r.collaborator_count.to_string(),
                r.fork_count.to_string(),
                r.star_count.to_string(),
                r.open_issue_count.to_string(),
                r.visibility.to_string(),
                r.license.clone().unwrap_or_default(),
            ]
        })
        .collect();

    Block::DataTable(DataTable {
        caption: Some("User repositories".to_string()),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows,
    })
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashError;
    use crate::model::RepositoryRecord;

    fn table() -> RepositoryTable {
        let mut a = RepositoryRecord::new("alpha");
        a.languages = [("Python", 100u64), ("JS", 50)].into_iter().collect();
        a.star_count = 3;
        let mut b = RepositoryRecord::new("beta");
        b.languages = [("Python", 50u64)].into_iter().collect();
        b.star_count = 10;
        b.visibility = Visibility::Private;
        let mut c = RepositoryRecord::new("gamma");
        c.languages = [("Go", 100u64)].into_iter().collect();
        RepositoryTable::new(vec![a, b, c]).unwrap()
    }

    fn profile() -> UserProfile {
        UserProfile {
            login: "octo".into(),
            public_repos: 2,
            ..UserProfile::default()
        }
    }

    #[test]
    fn ordinals() {
        let got: Vec<_> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 101].iter().map(|&n| ordinal(n)).collect();
        assert_eq!(got, ["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "101st"]);
    }

    #[test]
    fn leader_sentence_handles_short_lists() {
        let share = |l: &str| LanguageShare { language: l.into(), fraction: 0.5 };
        assert_eq!(leader_sentence(&[]), "No language data is available.");
        assert_eq!(
            leader_sentence(&[share("A"), share("B"), share("C")]),
            "The most present language is *A*, followed by *B* and *C*."
        );
    }

    #[test]
    fn profile_text_is_not_read_as_markup() {
        let t = table();
        let p = UserProfile {
            bio: Some("Fan of C* and *nix".into()),
            ..profile()
        };
        let doc = dashboard(&DashboardInput {
            profile: &p,
            repositories: &t,
            projects: &[],
            highlight_language: "Go",
        })
        .unwrap();
        let html = crate::report::render_html(&doc);
        assert!(html.contains("<strong>bio</strong>: Fan of C* and *nix"));
        assert!(!html.contains("Fan of C<em>"));
    }

    #[test]
    fn dashboard_has_three_pages() {
        let t = table();
        let p = profile();
        let doc = dashboard(&DashboardInput {
            profile: &p,
            repositories: &t,
            projects: &[],
            highlight_language: "Go",
        })
        .unwrap();
        let titles: Vec<_> = doc.pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Highlights", "Languages", "Repositories"]);

        let Block::Text(summary) = &doc.pages[0].blocks[2] else {
            panic!("expected summary text");
        };
        assert!(summary.contains("*3 repositories*"));
        assert!(summary.contains("*13 stars*"));

        let narrative = doc.pages[1]
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Text(t) if t.contains("comes") => Some(t.clone()),
                _ => None,
            })
            .unwrap();
        assert!(narrative.contains("Go comes 2nd with 100 bytes of code, followed by JS."));
    }

    #[test]
    fn unknown_highlight_language_fails() {
        let t = table();
        let p = profile();
        let err = dashboard(&DashboardInput {
            profile: &p,
            repositories: &t,
            projects: &[],
            highlight_language: "Rust",
        })
        .unwrap_err();
        assert!(matches!(err, DashError::UnknownLanguage(l) if l == "Rust"));
    }

    #[test]
    fn most_starred_table_orders_rows() {
        let Block::DataTable(dt) = most_starred_table(&table()) else {
            panic!("expected table");
        };
        let names: Vec<_> = dt.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, ["beta", "alpha", "gamma"]);
        assert_eq!(dt.rows[1][1], "Python: 100, JS: 50");
        assert_eq!(dt.rows[0][9], "Private");
    }
}
