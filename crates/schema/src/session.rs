//! View sessions and the sibling registry.
//!
//! A [`Session`] carries the per-connection state the serializer consults
//! on root trees: the public view-model identity, the incremental patch
//! version pair and the namespace policy flag. A [`SiblingSet`] is the
//! registry of view-model trees from cooperating applications that share
//! one mount point; it borrows every member (including the one being
//! serialized) for the duration of a pass and owns none of them.

use crate::instance::Json;

/// Local/remote version counters of the incremental patch protocol, plus
/// the wire names they are emitted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModelVersion {
    pub local_version: i64,
    pub remote_version: i64,
    pub local_version_property_name: String,
    pub remote_version_property_name: String,
}

impl Default for ViewModelVersion {
    fn default() -> Self {
        Self {
            local_version: 0,
            remote_version: 0,
            local_version_property_name: "_ver#s".to_owned(),
            remote_version_property_name: "_ver#c$".to_owned(),
        }
    }
}

impl ViewModelVersion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump_local(&mut self) {
        self.local_version += 1;
    }

    pub fn bump_remote(&mut self) {
        self.remote_version += 1;
    }
}

/// Per-connection serialization context for root trees.
#[derive(Debug, Default)]
pub struct Session {
    public_root: Option<u64>,
    version: Option<ViewModelVersion>,
    namespaces_enabled: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a tree as this session's public view-model root. Version
    /// headers are emitted only on that tree.
    pub fn set_public_root(&mut self, json: &Json) {
        self.public_root = Some(json.tree_id());
    }

    pub fn is_public_root(&self, json: &Json) -> bool {
        self.public_root == Some(json.tree_id())
    }

    pub fn set_version(&mut self, version: ViewModelVersion) {
        self.version = Some(version);
    }

    pub fn version(&self) -> Option<&ViewModelVersion> {
        self.version.as_ref()
    }

    pub fn version_mut(&mut self) -> Option<&mut ViewModelVersion> {
        self.version.as_mut()
    }

    pub fn enable_namespaces(&mut self, on: bool) {
        self.namespaces_enabled = on;
    }

    pub fn namespaces_enabled(&self) -> bool {
        self.namespaces_enabled
    }
}

/// One entry of a [`SiblingSet`]: a cooperating application's view model
/// and the URL of its partial content.
#[derive(Debug, Clone, Copy)]
pub struct Sibling<'a> {
    pub app_name: &'a str,
    pub partial_url: &'a str,
    pub tree: &'a Json,
}

/// Ordered registry of the view models sharing one mount point.
///
/// The set is symmetric: the tree being serialized appears in it alongside
/// every other application's tree, and membership is tested by tree id.
#[derive(Debug, Default)]
pub struct SiblingSet<'a> {
    entries: Vec<Sibling<'a>>,
}

impl<'a> SiblingSet<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, app_name: &'a str, partial_url: &'a str, tree: &'a Json) {
        self.entries.push(Sibling {
            app_name,
            partial_url,
            tree,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sibling<'a>> {
        self.entries.iter()
    }

    pub fn contains(&self, tree: &Json) -> bool {
        self.entries.iter().any(|s| s.tree.tree_id() == tree.tree_id())
    }
}

impl<'a, 'b> IntoIterator for &'b SiblingSet<'a> {
    type Item = &'b Sibling<'a>;
    type IntoIter = std::slice::Iter<'b, Sibling<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
