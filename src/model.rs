use crate::error::{DashError, Result};
use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn from_private_flag(private: bool) -> Self {
        if private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Visibility::Public => "Public",
            Visibility::Private => "Private",
        })
    }
}

/// Byte counts per language, kept in first-insertion order.
///
/// Order matters: ties in the descending percentage sort are broken by the
/// position a language first appeared at.
#[derive(Debug, Clone, Default)]
pub struct LanguageBytes {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl LanguageBytes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `bytes` to `language`, appending it if unseen.
    pub fn add(&mut self, language: &str, bytes: u64) {
        match self.index.get(language) {
            Some(&i) => self.entries[i].1 += bytes,
            None => {
                self.index.insert(language.to_string(), self.entries.len());
                self.entries.push((language.to_string(), bytes));
            }
        }
    }

    pub fn get(&self, language: &str) -> Option<u64> {
        self.index.get(language).map(|&i| self.entries[i].1)
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, b)| b).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries.iter().map(|(l, b)| (l.as_str(), *b))
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(l, _)| l.as_str())
    }
}

impl PartialEq for LanguageBytes {
    /// Map equality: insertion order is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(l, b)| other.get(l) == Some(b))
    }
}

impl<S: AsRef<str>> FromIterator<(S, u64)> for LanguageBytes {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut out = LanguageBytes::new();
        for (language, bytes) in iter {
            out.add(language.as_ref(), bytes);
        }
        out
    }
}

impl Serialize for LanguageBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (language, bytes) in &self.entries {
            map.serialize_entry(language, bytes)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LanguageBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct LanguageVisitor;

        impl<'de> Visitor<'de> for LanguageVisitor {
            type Value = LanguageBytes;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of language names to byte counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut out = LanguageBytes::new();
                while let Some((language, bytes)) = access.next_entry::<String, u64>()? {
                    out.add(&language, bytes);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(LanguageVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub name: String,
    pub languages: LanguageBytes,
    pub topics: Vec<String>,
    pub description: Option<String>,
    pub commit_count: u64,
    pub collaborator_count: u64,
    pub fork_count: u64,
    pub star_count: u64,
    pub open_issue_count: u64,
    pub visibility: Visibility,
    pub license: Option<String>,
}

impl RepositoryRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            languages: LanguageBytes::new(),
            topics: Vec::new(),
            description: None,
            commit_count: 0,
            collaborator_count: 0,
            fork_count: 0,
            star_count: 0,
            open_issue_count: 0,
            visibility: Visibility::Public,
            license: None,
        }
    }
}

/// Sort keys for the repository listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RepositoryField {
    Name,
    Commits,
    Collaborators,
    Forks,
    Stars,
    OpenIssues,
}

/// Repositories keyed by name, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RepositoryRecord>", into = "Vec<RepositoryRecord>")]
pub struct RepositoryTable {
    records: Vec<RepositoryRecord>,
}

impl RepositoryTable {
    pub fn new(records: Vec<RepositoryRecord>) -> Result<Self> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.name.as_str()) {
                return Err(DashError::DuplicateRepository(record.name.clone()));
            }
        }
        Ok(Self { records })
    }

    pub fn get(&self, name: &str) -> Option<&RepositoryRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RepositoryRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[RepositoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_stars(&self) -> u64 {
        self.records.iter().map(|r| r.star_count).sum()
    }

    pub fn count_visibility(&self, visibility: Visibility) -> usize {
        self.records.iter().filter(|r| r.visibility == visibility).count()
    }

    /// Stable sort on `field`; equal keys keep their listing order.
    pub fn sorted_by(&self, field: RepositoryField, descending: bool) -> Self {
        let mut records = self.records.clone();
        // invert the comparison rather than reverse(), which would flip ties
        records.sort_by(|a, b| {
            let ord = compare_field(a, b, field);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
        Self { records }
    }

    pub fn most_starred(&self) -> Self {
        self.sorted_by(RepositoryField::Stars, true)
    }
}

fn compare_field(a: &RepositoryRecord, b: &RepositoryRecord, field: RepositoryField) -> Ordering {
    match field {
        RepositoryField::Name => a.name.cmp(&b.name),
        RepositoryField::Commits => a.commit_count.cmp(&b.commit_count),
        RepositoryField::Collaborators => a.collaborator_count.cmp(&b.collaborator_count),
        RepositoryField::Forks => a.fork_count.cmp(&b.fork_count),
        RepositoryField::Stars => a.star_count.cmp(&b.star_count),
        RepositoryField::OpenIssues => a.open_issue_count.cmp(&b.open_issue_count),
    }
}

impl TryFrom<Vec<RepositoryRecord>> for RepositoryTable {
    type Error = DashError;

    fn try_from(records: Vec<RepositoryRecord>) -> Result<Self> {
        RepositoryTable::new(records)
    }
}

impl From<RepositoryTable> for Vec<RepositoryRecord> {
    fn from(table: RepositoryTable) -> Self {
        table.records
    }
}

impl<'a> IntoIterator for &'a RepositoryTable {
    type Item = &'a RepositoryRecord;
    type IntoIter = std::slice::Iter<'a, RepositoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub language: String,
    pub fraction: f64,
}

pub type LanguagePercentages = Vec<LanguageShare>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageRank {
    pub language: String,
    pub position: usize,
    pub bytes: u64,
    pub fraction: f64,
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorWeek {
    pub week: DateTime<Utc>,
    pub commits: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorStats {
    pub author: String,
    pub total: u64,
    pub weeks: Vec<ContributorWeek>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorActivity {
    pub author: String,
    pub total_commits: u64,
    pub week: DateTime<Utc>,
    pub weekly_commits: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = DashError;

    fn try_from(raw: RawWindow) -> Result<Self> {
        TimeWindow::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(DashError::InvalidWindow(format!(
                "start ({start}) is after end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        timestamp >= &self.start && timestamp <= &self.end
    }

    /// Bounds in epoch milliseconds, the unit chart time scales use.
    pub fn as_millis(&self) -> [i64; 2] {
        [self.start.timestamp_millis(), self.end.timestamp_millis()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub avatar_url: Option<String>,
    pub public_repos: u64,
    pub private_repos: Option<u64>,
    pub followers: u64,
    pub following: u64,
    pub organizations: u64,
}

impl UserProfile {
    pub fn total_repos(&self) -> u64 {
        self.public_repos + self.private_repos.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInsights {
    pub full_name: String,
    pub window: Option<TimeWindow>,
    pub languages: LanguagePercentages,
    pub activity: Vec<ContributorActivity>,
}

/// Everything one run fetched, in exportable form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub profile: UserProfile,
    pub repositories: RepositoryTable,
    pub projects: Vec<ProjectInsights>,
}

impl Snapshot {
    pub fn new(profile: UserProfile, repositories: RepositoryTable, projects: Vec<ProjectInsights>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            profile,
            repositories,
            projects,
        }
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        if snapshot.version != SCHEMA_VERSION {
            return Err(DashError::Config(format!(
                "Snapshot version mismatch: expected {}, found {}",
                SCHEMA_VERSION, snapshot.version
            )));
        }
        Ok(snapshot)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoriesOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub user: String,
    pub total_stars: u64,
    pub entries: Vec<RepositoryRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub language: String,
    pub bytes: u64,
    pub fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguagesOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub user: String,
    pub total_bytes: u64,
    pub rank: Option<LanguageRank>,
    pub entries: Vec<LanguageEntry>,
}
