//! Registration of file paths into a project's group tree.
//!
//! Each path is split into directory names and a file name. Groups are
//! found or created level by level starting at the main group, then the
//! file reference is found or created in the last group. A newly created
//! reference is attached to every target. Lookups at every level make the
//! whole operation idempotent.

use crate::error::Result;
use crate::id::ObjectId;
use crate::project::{Node, NodeKind, Project, Target};
use serde::Serialize;
use std::collections::btree_map::{BTreeMap, Entry as BTreeEntry};
use std::collections::hash_map::{Entry, HashMap};
use std::path::{Component, Path};
use tracing::{debug, warn};

/// A path split into directory names and a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParts {
    pub dirs: Vec<String>,
    pub file_name: String,
}

/// Split a path into the groups it implies and its file name.
///
/// `.` and root components are dropped; `..` is kept as a name. Returns
/// `None` when the path has no file name (empty, or ending in `..`).
pub fn split_path(path: &str) -> Option<PathParts> {
    let path = Path::new(path);
    let file_name = path.file_name()?.to_string_lossy().into_owned();

    let dirs = path
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect();

    Some(PathParts { dirs, file_name })
}

/// What happened to one input path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A new file reference was created.
    Created,
    /// The file reference was already present, or the path lies inside a
    /// synchronized folder; nothing changed.
    Existing,
    /// The path has no file name and was ignored.
    Skipped,
}

/// Result of registering one path.
#[derive(Debug, Clone, Serialize)]
pub struct PathRegistration {
    pub path: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<ObjectId>,
    /// Groups created for this path, as `/`-joined group paths.
    pub groups_created: Vec<String>,
    /// Names of the targets the new reference was attached to.
    pub targets: Vec<String>,
}

/// Result of a registration run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrationReport {
    pub paths: Vec<PathRegistration>,
}

impl RegistrationReport {
    /// Number of file references created.
    pub fn files_created(&self) -> usize {
        self.count(Outcome::Created)
    }

    /// Number of paths that were already registered.
    pub fn files_existing(&self) -> usize {
        self.count(Outcome::Existing)
    }

    /// Number of paths ignored for lack of a file name.
    pub fn skipped(&self) -> usize {
        self.count(Outcome::Skipped)
    }

    /// Number of groups created.
    pub fn groups_created(&self) -> usize {
        self.paths.iter().map(|p| p.groups_created.len()).sum()
    }

    /// True if the run changed the project.
    pub fn changed(&self) -> bool {
        self.files_created() > 0 || self.groups_created() > 0
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.paths.iter().filter(|p| p.outcome == outcome).count()
    }
}

/// Register every path in `paths`, in order.
pub fn register_paths<S: AsRef<str>>(
    project: &mut Project,
    paths: &[S],
) -> Result<RegistrationReport> {
    let mut registrar = Registrar::new(project);
    let mut report = RegistrationReport::default();
    for path in paths {
        report.paths.push(registrar.register(path.as_ref())?);
    }
    Ok(report)
}

/// Children of one group keyed by path segment.
#[derive(Debug, Default)]
struct ChildIndex {
    groups: BTreeMap<String, ObjectId>,
    files: BTreeMap<String, ObjectId>,
    synchronized: BTreeMap<String, ObjectId>,
}

impl ChildIndex {
    /// The first child with a given path wins, as in a front-to-back scan.
    fn from_children(children: &[Node]) -> Self {
        let mut index = ChildIndex::default();
        for child in children {
            let Some(path) = &child.path else { continue };
            let map = match child.kind {
                NodeKind::Group => &mut index.groups,
                NodeKind::File => &mut index.files,
                NodeKind::Synchronized => &mut index.synchronized,
                NodeKind::Other => continue,
            };
            if let BTreeEntry::Vacant(slot) = map.entry(path.clone()) {
                slot.insert(child.id.clone());
            }
        }
        index
    }
}

/// Walks and extends the group tree of one project.
pub struct Registrar<'p> {
    project: &'p mut Project,
    targets: Vec<Target>,
    index: HashMap<ObjectId, ChildIndex>,
}

impl<'p> Registrar<'p> {
    pub fn new(project: &'p mut Project) -> Self {
        let targets = project.targets();
        Self {
            project,
            targets,
            index: HashMap::new(),
        }
    }

    /// Register a single path.
    pub fn register(&mut self, path: &str) -> Result<PathRegistration> {
        let Some(parts) = split_path(path) else {
            warn!(path, "Skipping path without a file name");
            return Ok(PathRegistration {
                path: path.to_string(),
                outcome: Outcome::Skipped,
                file: None,
                groups_created: Vec::new(),
                targets: Vec::new(),
            });
        };

        let mut groups_created = Vec::new();
        let mut group = self.project.main_group().clone();
        for (depth, dir) in parts.dirs.iter().enumerate() {
            let index = self.child_index(&group)?;
            let existing = index.groups.get(dir).cloned();
            if existing.is_none()
                && let Some(folder) = index.synchronized.get(dir)
            {
                debug!(path, folder = %folder, "Inside a synchronized folder");
                return Ok(PathRegistration {
                    path: path.to_string(),
                    outcome: Outcome::Existing,
                    file: None,
                    groups_created,
                    targets: Vec::new(),
                });
            }
            group = match existing {
                Some(existing) => existing,
                None => {
                    let created = self.project.new_group(&group, dir, dir)?;
                    self.child_index(&group)?
                        .groups
                        .insert(dir.clone(), created.clone());
                    self.index.insert(created.clone(), ChildIndex::default());
                    groups_created.push(parts.dirs[..=depth].join("/"));
                    created
                }
            };
        }

        if let Some(existing) = self.child_index(&group)?.files.get(&parts.file_name) {
            debug!(path, file = %existing, "Already registered");
            return Ok(PathRegistration {
                path: path.to_string(),
                outcome: Outcome::Existing,
                file: Some(existing.clone()),
                groups_created,
                targets: Vec::new(),
            });
        }

        let file = self.project.new_file(&group, &parts.file_name)?;
        self.child_index(&group)?
            .files
            .insert(parts.file_name.clone(), file.clone());

        let mut targets = Vec::new();
        for target in &self.targets {
            if self.project.attach(target, &file)? {
                targets.push(target.name.clone());
            }
        }

        debug!(path, file = %file, targets = targets.len(), "Registered file");
        Ok(PathRegistration {
            path: path.to_string(),
            outcome: Outcome::Created,
            file: Some(file),
            groups_created,
            targets,
        })
    }

    /// The child index of `group`, built on first use.
    fn child_index(&mut self, group: &ObjectId) -> Result<&mut ChildIndex> {
        match self.index.entry(group.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let children = self.project.children(group)?;
                Ok(entry.insert(ChildIndex::from_children(&children)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{DEMO_PBXPROJ, write_demo_project};
    use crate::project::PBXPROJ_FILE;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn demo() -> Project {
        Project::parse(DEMO_PBXPROJ, "Demo.xcodeproj/project.pbxproj").unwrap()
    }

    /// Follow `dirs` from the main group by path segment.
    fn find_group(project: &Project, dirs: &[&str]) -> Option<ObjectId> {
        let mut group = project.main_group().clone();
        for dir in dirs {
            let children = project.children(&group).unwrap();
            let matches: Vec<_> = children
                .iter()
                .filter(|c| c.kind == NodeKind::Group && c.path.as_deref() == Some(*dir))
                .collect();
            assert!(matches.len() <= 1, "duplicate group {}", dir);
            group = matches.first()?.id.clone();
        }
        Some(group)
    }

    fn files_in(project: &Project, group: &ObjectId) -> Vec<String> {
        project
            .children(group)
            .unwrap()
            .into_iter()
            .filter(|c| c.kind == NodeKind::File)
            .filter_map(|c| c.path)
            .collect()
    }

    #[test]
    fn test_split_path() {
        let parts = split_path("Sub/Dir/File.ext").unwrap();
        assert_eq!(parts.dirs, vec!["Sub", "Dir"]);
        assert_eq!(parts.file_name, "File.ext");

        let bare = split_path("File.ext").unwrap();
        assert!(bare.dirs.is_empty());

        let dotted = split_path("./A/./B/C.swift").unwrap();
        assert_eq!(dotted.dirs, vec!["A", "B"]);

        let absolute = split_path("/A/C.swift").unwrap();
        assert_eq!(absolute.dirs, vec!["A"]);

        let trailing = split_path("A/B/").unwrap();
        assert_eq!(trailing.dirs, vec!["A"]);
        assert_eq!(trailing.file_name, "B");

        let parent = split_path("../Shared/C.swift").unwrap();
        assert_eq!(parent.dirs, vec!["..", "Shared"]);
    }

    #[test]
    fn test_split_path_without_file_name() {
        assert_eq!(split_path(""), None);
        assert_eq!(split_path("A/.."), None);
        assert_eq!(split_path("/"), None);
    }

    #[test]
    fn test_path_to_tree_correspondence() {
        let mut project = demo();
        let report = register_paths(&mut project, &["Sub/Dir/File.ext"]).unwrap();

        let dir = find_group(&project, &["Sub", "Dir"]).unwrap();
        assert_eq!(files_in(&project, &dir), vec!["File.ext"]);

        let entry = &report.paths[0];
        assert_eq!(entry.outcome, Outcome::Created);
        assert_eq!(entry.groups_created, vec!["Sub", "Sub/Dir"]);

        let sub = project.object(&find_group(&project, &["Sub"]).unwrap()).unwrap();
        assert_eq!(sub["name"].as_str(), Some("Sub"));
        assert_eq!(sub["path"].as_str(), Some("Sub"));
    }

    #[test]
    fn test_multi_path_sharing() {
        let mut project = demo();
        let report = register_paths(&mut project, &["A/X.ext", "A/Y.ext"]).unwrap();

        let a = find_group(&project, &["A"]).unwrap();
        assert_eq!(files_in(&project, &a), vec!["X.ext", "Y.ext"]);
        assert_eq!(report.groups_created(), 1);
        assert_eq!(report.files_created(), 2);
    }

    #[test]
    fn test_reuses_existing_groups_and_files() {
        let mut project = demo();
        let before = project.object_count();
        let report = register_paths(
            &mut project,
            &["Sources/App.swift", "Sources/Model/User.swift"],
        )
        .unwrap();

        assert_eq!(report.files_existing(), 2);
        assert!(!report.changed());
        assert_eq!(project.object_count(), before);
        assert_eq!(project.to_pbxproj(), DEMO_PBXPROJ);
    }

    #[test]
    fn test_new_file_in_existing_group() {
        let mut project = demo();
        let report = register_paths(&mut project, &["Sources/Model/Order.swift"]).unwrap();

        assert_eq!(report.groups_created(), 0);
        let model = find_group(&project, &["Sources", "Model"]).unwrap();
        assert_eq!(files_in(&project, &model), vec!["User.swift", "Order.swift"]);
    }

    #[test]
    fn test_group_without_path_is_not_matched() {
        // "Products" only has a name, so a path segment "Products" gets its own group.
        let mut project = demo();
        let report = register_paths(&mut project, &["Products/Gen.swift"]).unwrap();
        assert_eq!(report.groups_created(), 1);
    }

    #[test]
    fn test_synchronized_folder_covers_paths() {
        let text = DEMO_PBXPROJ.replacen(
            "G10000000000000000000002 /* Sources */ = {\n\t\t\tisa = PBXGroup;",
            "G10000000000000000000002 /* Sources */ = {\n\t\t\tisa = PBXFileSystemSynchronizedRootGroup;",
            1,
        );
        let mut project = Project::parse(&text, "Demo.xcodeproj/project.pbxproj").unwrap();
        let before = project.to_pbxproj();

        let report =
            register_paths(&mut project, &["Sources/Gen.swift", "Sources/Model/Gen.swift"]).unwrap();

        for entry in &report.paths {
            assert_eq!(entry.outcome, Outcome::Existing);
            assert!(entry.file.is_none());
            assert!(entry.groups_created.is_empty());
        }
        assert!(!report.changed());
        assert_eq!(project.to_pbxproj(), before);

        let main = project.children(project.main_group()).unwrap();
        assert_eq!(main[0].kind, NodeKind::Synchronized);
        assert_eq!(
            main.iter()
                .filter(|c| c.path.as_deref() == Some("Sources"))
                .count(),
            1
        );
    }

    #[test]
    fn test_target_attachment_breadth() {
        let mut project = demo();
        let report = register_paths(&mut project, &["Gen/Order.swift"]).unwrap();
        let file = report.paths[0].file.clone().unwrap();

        let targets = project.targets();
        let native: Vec<_> = targets.iter().filter(|t| t.accepts_files()).collect();
        assert_eq!(native.len(), 2);
        for target in &native {
            let files = project.build_files(&target.id);
            assert_eq!(files.iter().filter(|f| **f == file).count(), 1);
        }
        assert_eq!(report.paths[0].targets, vec!["Demo", "DemoTests"]);

        let again = register_paths(&mut project, &["Gen/Order.swift"]).unwrap();
        assert!(again.paths[0].targets.is_empty());
        for target in &native {
            let files = project.build_files(&target.id);
            assert_eq!(files.iter().filter(|f| **f == file).count(), 1);
        }
    }

    #[test]
    fn test_duplicate_path_in_one_run() {
        let mut project = demo();
        let report = register_paths(&mut project, &["A/X.swift", "A/X.swift"]).unwrap();
        assert_eq!(report.paths[0].outcome, Outcome::Created);
        assert_eq!(report.paths[1].outcome, Outcome::Existing);
        assert_eq!(report.paths[0].file, report.paths[1].file);
    }

    #[test]
    fn test_skipped_paths() {
        let mut project = demo();
        let report = register_paths(&mut project, &["", "A/.."]).unwrap();
        assert_eq!(report.skipped(), 2);
        assert_eq!(project.to_pbxproj(), DEMO_PBXPROJ);
    }

    #[test]
    fn test_no_paths_no_mutation() {
        let mut project = demo();
        let report = register_paths::<&str>(&mut project, &[]).unwrap();
        assert!(report.paths.is_empty());
        assert_eq!(project.to_pbxproj(), DEMO_PBXPROJ);
    }

    #[test]
    fn test_idempotent_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let bundle = write_demo_project(temp_dir.path());
        let paths = ["Gen/Models/User+Codable.swift", "Gen/Bridge.h", "Top.swift"];

        let mut first = Project::open(&bundle).unwrap();
        register_paths(&mut first, &paths).unwrap();
        first.save().unwrap();
        let after_first = fs::read_to_string(bundle.join(PBXPROJ_FILE)).unwrap();

        let mut second = Project::open(&bundle).unwrap();
        let report = register_paths(&mut second, &paths).unwrap();
        second.save().unwrap();
        let after_second = fs::read_to_string(bundle.join(PBXPROJ_FILE)).unwrap();

        assert!(!report.changed());
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn test_report_json() {
        let mut project = demo();
        let report = register_paths(&mut project, &["A/X.swift", ""]).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["paths"][0]["outcome"], "created");
        assert_eq!(json["paths"][0]["groups_created"][0], "A");
        assert_eq!(json["paths"][1]["outcome"], "skipped");
        assert!(json["paths"][1].get("file").is_none());
    }

    fn arb_path() -> impl Strategy<Value = String> {
        (
            prop::collection::vec(prop::sample::select(vec!["A", "B", "Sources"]), 0..3),
            prop::sample::select(vec!["x.swift", "y.h", "App.swift", "z.json"]),
        )
            .prop_map(|(dirs, file)| {
                let mut parts: Vec<&str> = dirs;
                parts.push(file);
                parts.join("/")
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Registering the same paths twice leaves the project unchanged the second time.
        #[test]
        fn prop_registration_idempotent(paths in prop::collection::vec(arb_path(), 0..8)) {
            let mut project = demo();
            register_paths(&mut project, &paths)?;
            let once = project.to_pbxproj();

            let report = register_paths(&mut project, &paths)?;
            prop_assert!(!report.changed());
            prop_assert_eq!(project.to_pbxproj(), once);
        }

        /// Every registered path resolves to exactly one file reference.
        #[test]
        fn prop_each_path_has_one_reference(paths in prop::collection::vec(arb_path(), 1..8)) {
            let mut project = demo();
            register_paths(&mut project, &paths)?;

            for path in &paths {
                let parts = split_path(path).unwrap();
                let dirs: Vec<&str> = parts.dirs.iter().map(String::as_str).collect();
                let group = find_group(&project, &dirs).unwrap();
                let count = files_in(&project, &group)
                    .iter()
                    .filter(|f| **f == parts.file_name)
                    .count();
                prop_assert_eq!(count, 1);
            }
        }
    }
}
