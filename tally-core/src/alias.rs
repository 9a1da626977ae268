use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use tally_types::{Alias, MemberName, RefreshReport, UserId};

/// Turns a free-text handle into a platform user id.
pub trait HandleResolver {
    fn resolve(&self, handle: &str) -> Option<UserId>;
}

/// Canonical lookup key for a handle or display name: trimmed, lowercase,
/// single-spaced and `@`-prefixed. `None` when nothing is left.
pub fn normalize_handle(text: &str) -> Option<String> {
    let name = text
        .trim()
        .trim_start_matches('@')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if name.is_empty() {
        None
    } else {
        Some(format!("@{name}"))
    }
}

fn is_platform_id(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn first_word(key: &str) -> &str {
    key.split(' ').next().unwrap_or(key)
}

/// Handle lookup built from explicit aliases plus known member names.
///
/// The directory is an ordinary value: it is built once at startup and replaced
/// wholesale by [`AliasDirectory::refresh`], which bumps `generation`.
#[derive(Debug, Clone, Default)]
pub struct AliasDirectory {
    aliases: HashMap<String, UserId>,
    members: HashMap<String, BTreeSet<UserId>>,
    generation: u64,
    refreshed_at: Option<DateTime<Utc>>,
}

impl AliasDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a populated directory in one step
    pub fn build(
        aliases: impl IntoIterator<Item = Alias>,
        members: impl IntoIterator<Item = MemberName>,
    ) -> Self {
        let mut directory = Self::new();
        directory.refresh(aliases, members);
        directory
    }

    /// Replace the directory contents
    pub fn refresh(
        &mut self,
        aliases: impl IntoIterator<Item = Alias>,
        members: impl IntoIterator<Item = MemberName>,
    ) -> RefreshReport {
        self.aliases = aliases
            .into_iter()
            .filter_map(|alias| Some((normalize_handle(&alias.handle)?, alias.user_id)))
            .collect();

        self.members.clear();
        for member in members {
            if let Some(key) = normalize_handle(&member.display_name) {
                self.members.entry(key).or_default().insert(member.user_id);
            }
        }

        self.generation += 1;
        self.refreshed_at = Some(Utc::now());

        let report = RefreshReport {
            generation: self.generation,
            aliases: self.aliases.len() as u32,
            members: self.members.len() as u32,
        };

        tracing::info!(
            generation = report.generation,
            aliases = report.aliases,
            members = report.members,
            "alias directory refreshed"
        );

        report
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Unique id whose alias or member name shares its first word with `key`
    /// in either direction ("@zahir" vs "@zahir hassan").
    fn resolve_by_first_word(&self, key: &str) -> Option<UserId> {
        let key_first = first_word(key);
        let related = |candidate: &str| {
            candidate != key && (first_word(candidate) == key || candidate == key_first)
        };

        let mut candidates: BTreeSet<&UserId> = self
            .aliases
            .iter()
            .filter(|(name, _)| related(name.as_str()))
            .map(|(_, id)| id)
            .collect();
        for (name, ids) in &self.members {
            if related(name.as_str()) {
                candidates.extend(ids.iter());
            }
        }

        if candidates.len() == 1 {
            candidates.into_iter().next().cloned()
        } else {
            None
        }
    }
}

impl HandleResolver for AliasDirectory {
    fn resolve(&self, handle: &str) -> Option<UserId> {
        if is_platform_id(handle) {
            return Some(handle.to_string());
        }

        let key = normalize_handle(handle)?;

        if let Some(id) = self.aliases.get(&key) {
            return Some(id.clone());
        }

        if let Some(ids) = self.members.get(&key) {
            if ids.len() == 1 {
                return ids.iter().next().cloned();
            }
            tracing::debug!(handle = %key, matches = ids.len(), "ambiguous member name");
            return None;
        }

        self.resolve_by_first_word(&key)
    }
}
