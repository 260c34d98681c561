//! Consumer-side view of the directory.
//!
//! Consumers receive the directory as `Added` and `Removed` maps instead of
//! the full snapshot. The view keeps a copy of the last published map and
//! diffs each new snapshot against it by contact.

use tracing::debug;

use super::DirectorySnapshot;

/// Contacts that appeared or disappeared between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryChange {
    pub added: DirectorySnapshot,
    pub removed: DirectorySnapshot,
}

impl DirectoryChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Tracks what one consumer has been told.
#[derive(Debug, Default)]
pub struct ConsumerView {
    known: DirectorySnapshot,
}

impl ConsumerView {
    /// Starts a view from the current directory; everything is `added`.
    pub fn initial(snapshot: &DirectorySnapshot) -> (Self, DirectoryChange) {
        let change = DirectoryChange {
            added: snapshot.clone(),
            removed: DirectorySnapshot::new(),
        };
        (
            Self {
                known: snapshot.clone(),
            },
            change,
        )
    }

    /// Diffs `snapshot` against what the consumer already knows.
    pub fn update(&mut self, snapshot: &DirectorySnapshot) -> DirectoryChange {
        let added: DirectorySnapshot = snapshot
            .iter()
            .filter(|(contact, _)| !self.known.contains_key(*contact))
            .map(|(c, d)| (c.clone(), d.clone()))
            .collect();
        let removed: DirectorySnapshot = self
            .known
            .iter()
            .filter(|(contact, _)| !snapshot.contains_key(*contact))
            .map(|(c, d)| (c.clone(), d.clone()))
            .collect();

        self.known = snapshot.clone();
        debug!(added = added.len(), removed = removed.len(), "Directory view updated");
        DirectoryChange { added, removed }
    }

    pub fn known(&self) -> &DirectorySnapshot {
        &self.known
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Contact;

    fn snapshot(entries: &[(&str, &str)]) -> DirectorySnapshot {
        entries
            .iter()
            .map(|(addr, desc)| (Contact::new(*addr, "svc"), desc.to_string()))
            .collect()
    }

    #[test]
    fn test_initial_view_is_all_added() {
        let (view, change) = ConsumerView::initial(&snapshot(&[("a", "A"), ("b", "B")]));
        assert_eq!(change.added.len(), 2);
        assert!(change.removed.is_empty());
        assert_eq!(view.known().len(), 2);
    }

    #[test]
    fn test_update_reports_added_and_removed() {
        let (mut view, _) = ConsumerView::initial(&snapshot(&[("a", "A"), ("b", "B")]));
        let change = view.update(&snapshot(&[("b", "B"), ("c", "C")]));
        assert_eq!(change.added, snapshot(&[("c", "C")]));
        assert_eq!(change.removed, snapshot(&[("a", "A")]));
    }

    #[test]
    fn test_description_change_alone_is_not_reported() {
        let (mut view, _) = ConsumerView::initial(&snapshot(&[("a", "A")]));
        let change = view.update(&snapshot(&[("a", "A2")]));
        assert!(change.is_empty());
        assert_eq!(view.known().values().next().map(String::as_str), Some("A2"));
    }
}
