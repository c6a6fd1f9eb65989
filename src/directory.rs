//! Read-only queries over an unlocked database

use kdbx_rs::database::Field;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Field read by `get` when none is named
pub const DEFAULT_FIELD: &str = "Password";

#[derive(Debug, Error, PartialEq, Eq)]
/// A query that matched nothing
pub enum LookupError {
    /// No entry has the requested title
    #[error("No entry titled {0:?}")]
    NotFound(String),
    /// The entry exists but lacks the requested field
    #[error("Entry {title:?} has no field {field:?}")]
    FieldNotFound {
        /// Title of the entry that was found
        title: String,
        /// Field that was requested
        field: String,
    },
}

#[derive(Clone)]
/// A named record of fields with their plaintext values
pub struct Entry(kdbx_rs::database::Entry);

impl Entry {
    /// Create an entry with only a title
    pub fn new(title: &str) -> Entry {
        let mut entry = kdbx_rs::database::Entry::default();
        entry.add_field(Field::new("Title", title));
        Entry(entry)
    }

    /// Add a field
    pub fn with_field(mut self, key: &str, value: &str) -> Entry {
        self.0.add_field(Field::new(key, value));
        self
    }

    /// Set the password field
    pub fn with_password(mut self, password: &str) -> Entry {
        self.0.set_password(password);
        self
    }

    /// Title of the entry, empty if it has none
    pub fn title(&self) -> &str {
        self.0.title().unwrap_or("")
    }

    /// Value of the field called `key`
    pub fn field(&self, key: &str) -> Option<&str> {
        self.0.find(key).and_then(|f| f.value())
    }
}

impl From<kdbx_rs::database::Entry> for Entry {
    fn from(entry: kdbx_rs::database::Entry) -> Entry {
        Entry(entry)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Entry").field(&self.title()).finish()
    }
}

#[derive(Debug, Clone, Default)]
/// A named container of entries and nested groups
pub struct Group {
    name: String,
    entries: Vec<Entry>,
    groups: Vec<Group>,
}

impl Group {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Group {
        Group {
            name: name.into(),
            ..Group::default()
        }
    }

    /// Append an entry
    pub fn with_entry(mut self, entry: Entry) -> Group {
        self.entries.push(entry);
        self
    }

    /// Append a nested group
    pub fn with_group(mut self, group: Group) -> Group {
        self.groups.push(group);
        self
    }

    /// Name of the group
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries directly inside this group, in stored order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Groups directly inside this group, in stored order
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }
}

impl From<&kdbx_rs::database::Group> for Group {
    fn from(group: &kdbx_rs::database::Group) -> Group {
        Group {
            name: group.name().to_string(),
            entries: group.entries().cloned().map(Entry).collect(),
            groups: group.groups().map(Group::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// The decoded contents of a database
pub struct EntryTree {
    groups: Vec<Group>,
}

impl EntryTree {
    /// Build a tree from its top-level groups
    pub fn new(groups: Vec<Group>) -> EntryTree {
        EntryTree { groups }
    }

    /// Top-level groups in decoded order
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }
}

impl From<&kdbx_rs::Database> for EntryTree {
    fn from(database: &kdbx_rs::Database) -> EntryTree {
        EntryTree::new(vec![Group::from(database.root())])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Listing line for one top-level group
pub struct GroupSummary<'a> {
    /// Group name
    pub name: &'a str,
    /// Number of entries directly in the group
    pub entry_count: usize,
    /// Entry titles in stored order
    pub titles: Vec<&'a str>,
}

impl<'a> From<&'a Group> for GroupSummary<'a> {
    fn from(group: &'a Group) -> GroupSummary<'a> {
        GroupSummary {
            name: group.name(),
            entry_count: group.entries().len(),
            titles: group.entries().iter().map(Entry::title).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// Query facade over an [`EntryTree`]
pub struct EntryDirectory<'a> {
    tree: &'a EntryTree,
}

impl<'a> EntryDirectory<'a> {
    /// Query `tree`
    pub fn new(tree: &'a EntryTree) -> EntryDirectory<'a> {
        EntryDirectory { tree }
    }

    /// Summaries of the top-level groups, in decoded order
    ///
    /// The iterator is lazy and can be cloned to start over.
    pub fn list_groups(&self) -> impl Iterator<Item = GroupSummary<'a>> + Clone + 'a {
        self.tree.groups().iter().map(GroupSummary::from)
    }

    /// First entry in a top-level group whose title is exactly `title`
    pub fn find_entry_by_title(&self, title: &str) -> Result<&'a Entry, LookupError> {
        self.tree
            .groups()
            .iter()
            .flat_map(|group| group.entries())
            .find(|entry| entry.title() == title)
            .ok_or_else(|| LookupError::NotFound(title.to_string()))
    }

    /// Value of `field` on `entry`
    pub fn get_secret_field(
        &self,
        entry: &'a Entry,
        field: &str,
    ) -> Result<&'a str, LookupError> {
        entry.field(field).ok_or_else(|| LookupError::FieldNotFound {
            title: entry.title().to_string(),
            field: field.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> EntryTree {
        EntryTree::new(vec![
            Group::new("Personal")
                .with_entry(Entry::new("Email").with_password("mail-pass"))
                .with_entry(Entry::new("Bank").with_field("PIN", "1234"))
                .with_group(Group::new("Nested").with_entry(Entry::new("Hidden"))),
            Group::new("Work"),
        ])
    }

    #[test]
    fn summaries_follow_stored_order() {
        let tree = tree();
        let directory = EntryDirectory::new(&tree);
        let summaries: Vec<_> = directory.list_groups().collect();
        assert_eq!(
            summaries,
            vec![
                GroupSummary {
                    name: "Personal",
                    entry_count: 2,
                    titles: vec!["Email", "Bank"],
                },
                GroupSummary {
                    name: "Work",
                    entry_count: 0,
                    titles: vec![],
                },
            ]
        );
    }

    #[test]
    fn listing_restarts_from_a_clone() {
        let tree = tree();
        let directory = EntryDirectory::new(&tree);
        let mut listing = directory.list_groups();
        let restart = listing.clone();
        assert_eq!(listing.next().map(|g| g.name), Some("Personal"));
        assert_eq!(listing.next().map(|g| g.name), Some("Work"));
        assert_eq!(restart.count(), 2);
    }

    #[test]
    fn nested_groups_are_not_searched() {
        let tree = tree();
        let directory = EntryDirectory::new(&tree);
        assert_eq!(
            directory.find_entry_by_title("Hidden").unwrap_err(),
            LookupError::NotFound("Hidden".to_string())
        );
    }

    #[test]
    fn title_match_is_exact() {
        let tree = tree();
        let directory = EntryDirectory::new(&tree);
        assert!(directory.find_entry_by_title("email").is_err());
        assert!(directory.find_entry_by_title("Email ").is_err());
        assert_eq!(directory.find_entry_by_title("Email").unwrap().title(), "Email");
    }

    #[test]
    fn missing_field_names_entry_and_field() {
        let tree = tree();
        let directory = EntryDirectory::new(&tree);
        let bank = directory.find_entry_by_title("Bank").unwrap();
        assert_eq!(directory.get_secret_field(bank, "PIN"), Ok("1234"));
        assert_eq!(
            directory.get_secret_field(bank, DEFAULT_FIELD),
            Err(LookupError::FieldNotFound {
                title: "Bank".to_string(),
                field: "Password".to_string(),
            })
        );
    }
}
