//! Project loading, object access and saving.

use crate::error::{Error, Result};
use crate::file_type;
use crate::id::ObjectId;
use crate::plist::{self, Dictionary, Value};
use crate::writer::{self, isa_of, list_ids};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the project file inside an `.xcodeproj` bundle.
pub const PBXPROJ_FILE: &str = "project.pbxproj";

/// Value of `buildActionMask` Xcode writes for new build phases.
const BUILD_ACTION_MASK: &str = "2147483647";

/// Object kinds that act as containers in the group tree.
const GROUP_ISAS: &[&str] = &["PBXGroup", "PBXVariantGroup", "XCVersionGroup"];

/// Folders whose contents Xcode picks up from disk without file references.
const SYNCHRONIZED_ISA: &str = "PBXFileSystemSynchronizedRootGroup";

/// Object kinds that are build targets.
const TARGET_ISAS: &[&str] = &["PBXNativeTarget", "PBXAggregateTarget", "PBXLegacyTarget"];

/// Kind of a child in the group tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A group (folder).
    Group,
    /// A file reference.
    File,
    /// A folder synchronized with the file system. Everything below it is
    /// part of the project already.
    Synchronized,
    /// Anything else (reference proxies, ...).
    Other,
}

/// A child of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: ObjectId,
    pub kind: NodeKind,
    /// Display name, if set.
    pub name: Option<String>,
    /// Path segment relative to the parent group, if set.
    pub path: Option<String>,
}

/// A build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub id: ObjectId,
    pub name: String,
    pub isa: String,
}

impl Target {
    /// Only native targets compile files; aggregate and legacy targets
    /// have no sources phase.
    pub fn accepts_files(&self) -> bool {
        self.isa == "PBXNativeTarget"
    }
}

/// An Xcode project loaded into memory.
#[derive(Debug, Clone)]
pub struct Project {
    /// The `project.pbxproj` file.
    path: PathBuf,
    /// Bundle name without `.xcodeproj`, if known.
    name: Option<String>,
    root: Dictionary,
    root_object: ObjectId,
    main_group: ObjectId,
}

impl Project {
    /// Open a project.
    ///
    /// `path` may be the `.xcodeproj` bundle or the `project.pbxproj` file
    /// inside it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::load(path, "path does not exist"));
        }

        let file = if path.is_dir() {
            path.join(PBXPROJ_FILE)
        } else {
            path.to_path_buf()
        };

        if !file.is_file() {
            return Err(Error::load(path, format!("{} not found", PBXPROJ_FILE)));
        }

        let text = fs::read_to_string(&file).map_err(|e| Error::load(&file, e.to_string()))?;
        let project = Self::parse(&text, &file)?;

        debug!(path = %file.display(), "Loaded project");
        Ok(project)
    }

    /// Build a project from the text of a `project.pbxproj` file.
    ///
    /// `path` is where [`Project::save`] will write.
    pub fn parse(text: &str, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let root = match plist::parse(text) {
            Ok(Value::Dictionary(root)) => root,
            Ok(_) => return Err(Error::load(&path, "top level is not a dictionary")),
            Err(e) => return Err(Error::load(&path, e.to_string())),
        };

        let objects = root
            .get("objects")
            .and_then(Value::as_dict)
            .ok_or_else(|| Error::load(&path, "missing objects table"))?;

        let root_object = root
            .get("rootObject")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::load(&path, "missing rootObject"))?;

        if isa_of(objects, root_object) != Some("PBXProject") {
            return Err(Error::load(
                &path,
                format!("rootObject {} is not a PBXProject", root_object),
            ));
        }

        let main_group = objects
            .get(root_object)
            .and_then(Value::as_dict)
            .and_then(|project| project.get("mainGroup"))
            .and_then(Value::as_str)
            .ok_or_else(|| Error::load(&path, "project has no mainGroup"))?;

        if !isa_of(objects, main_group).is_some_and(|isa| GROUP_ISAS.contains(&isa)) {
            return Err(Error::load(
                &path,
                format!("mainGroup {} is not a group", main_group),
            ));
        }

        let root_object = ObjectId::new(root_object);
        let main_group = ObjectId::new(main_group);
        let name = bundle_name(&path);

        Ok(Self {
            path,
            name,
            root,
            root_object,
            main_group,
        })
    }

    /// Path of the `project.pbxproj` file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Project name taken from the bundle directory, if known.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The top-level group of the project.
    pub fn main_group(&self) -> &ObjectId {
        &self.main_group
    }

    /// Look up an object by id.
    pub fn object(&self, id: &ObjectId) -> Option<&Dictionary> {
        self.objects().get(id.as_str()).and_then(Value::as_dict)
    }

    /// Number of objects in the project.
    pub fn object_count(&self) -> usize {
        self.objects().len()
    }

    /// Children of a group, in order.
    ///
    /// Children whose id has no object are skipped.
    pub fn children(&self, group: &ObjectId) -> Result<Vec<Node>> {
        let obj = self.group(group)?;
        let objects = self.objects();

        let mut nodes = Vec::new();
        for child in list_ids(obj, "children") {
            let Some(child_obj) = objects.get(child).and_then(Value::as_dict) else {
                warn!(group = %group, child, "Skipping dangling child reference");
                continue;
            };
            let isa = child_obj.get("isa").and_then(Value::as_str).unwrap_or("");
            let kind = if GROUP_ISAS.contains(&isa) {
                NodeKind::Group
            } else if isa == "PBXFileReference" {
                NodeKind::File
            } else if isa == SYNCHRONIZED_ISA {
                NodeKind::Synchronized
            } else {
                NodeKind::Other
            };
            nodes.push(Node {
                id: ObjectId::new(child),
                kind,
                name: string_field(child_obj, "name"),
                path: string_field(child_obj, "path"),
            });
        }
        Ok(nodes)
    }

    /// Create a group under `parent` and append it to the parent's children.
    pub fn new_group(&mut self, parent: &ObjectId, name: &str, path: &str) -> Result<ObjectId> {
        self.group(parent)?;

        let id = self.allocate_id(&["PBXGroup", parent.as_str(), path]);
        let mut group = Dictionary::new();
        group.insert("isa".into(), "PBXGroup".into());
        group.insert("children".into(), Value::Array(Vec::new()));
        group.insert("name".into(), name.into());
        group.insert("path".into(), path.into());
        group.insert("sourceTree".into(), "<group>".into());

        self.insert_object(&id, group)?;
        self.push_id(parent, "children", &id)?;

        debug!(group = %id, parent = %parent, path, "Created group");
        Ok(id)
    }

    /// Create a file reference under `group` and append it to its children.
    pub fn new_file(&mut self, group: &ObjectId, path: &str) -> Result<ObjectId> {
        self.group(group)?;

        let id = self.allocate_id(&["PBXFileReference", group.as_str(), path]);
        let mut file = Dictionary::new();
        file.insert("isa".into(), "PBXFileReference".into());
        file.insert(
            "lastKnownFileType".into(),
            file_type::last_known_file_type(path).into(),
        );
        file.insert("path".into(), path.into());
        file.insert("sourceTree".into(), "<group>".into());

        self.insert_object(&id, file)?;
        self.push_id(group, "children", &id)?;

        debug!(file = %id, group = %group, path, "Created file reference");
        Ok(id)
    }

    /// All targets of the project, in project order.
    pub fn targets(&self) -> Vec<Target> {
        let objects = self.objects();
        let Some(project) = objects.get(self.root_object.as_str()).and_then(Value::as_dict)
        else {
            return Vec::new();
        };

        list_ids(project, "targets")
            .filter_map(|id| {
                let obj = objects.get(id).and_then(Value::as_dict)?;
                let isa = obj.get("isa").and_then(Value::as_str)?;
                if !TARGET_ISAS.contains(&isa) {
                    return None;
                }
                Some(Target {
                    id: ObjectId::new(id),
                    name: string_field(obj, "name").unwrap_or_default(),
                    isa: isa.to_string(),
                })
            })
            .collect()
    }

    /// Attach a file reference to a target.
    ///
    /// Headers go to the target's headers phase, everything else to its
    /// sources phase; the phase is created if the target has none. Returns
    /// `false` when the phase already holds the file or the target does not
    /// compile files.
    pub fn attach(&mut self, target: &Target, file: &ObjectId) -> Result<bool> {
        if !target.accepts_files() {
            debug!(target = %target.name, "Target does not take files");
            return Ok(false);
        }

        let file_path = self
            .object(file)
            .filter(|obj| obj.get("isa").and_then(Value::as_str) == Some("PBXFileReference"))
            .ok_or_else(|| Error::invalid_object(file.as_str(), "not a file reference"))?
            .get("path")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let phase_isa = if file_type::is_header(&file_path) {
            "PBXHeadersBuildPhase"
        } else {
            "PBXSourcesBuildPhase"
        };
        let phase = self.find_or_create_phase(&target.id, phase_isa)?;

        if self.build_file_in_phase(&phase, file).is_some() {
            return Ok(false);
        }

        let id = self.allocate_id(&["PBXBuildFile", phase.as_str(), file.as_str()]);
        let mut build_file = Dictionary::new();
        build_file.insert("isa".into(), "PBXBuildFile".into());
        build_file.insert("fileRef".into(), file.as_str().into());

        self.insert_object(&id, build_file)?;
        self.push_id(&phase, "files", &id)?;

        debug!(build_file = %id, target = %target.name, file = %file_path, "Attached file to target");
        Ok(true)
    }

    /// File references built by a target, across all its build phases.
    pub fn build_files(&self, target: &ObjectId) -> Vec<ObjectId> {
        let objects = self.objects();
        let Some(target) = objects.get(target.as_str()).and_then(Value::as_dict) else {
            return Vec::new();
        };

        list_ids(target, "buildPhases")
            .filter_map(|phase| objects.get(phase).and_then(Value::as_dict))
            .flat_map(|phase| list_ids(phase, "files"))
            .filter_map(|bf| {
                objects
                    .get(bf)
                    .and_then(Value::as_dict)
                    .and_then(|bf| bf.get("fileRef"))
                    .and_then(Value::as_str)
            })
            .map(ObjectId::new)
            .collect()
    }

    /// Serialize the project in Xcode's layout.
    pub fn to_pbxproj(&self) -> String {
        writer::write_project(&self.root, self.name.as_deref())
    }

    /// Write the project back to the file it was loaded from.
    pub fn save(&self) -> Result<()> {
        self.write_to(&self.path)
    }

    /// Write the project to `path`, replacing it atomically.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_pbxproj();

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::save(path, e))?;
        temp.write_all(text.as_bytes()).map_err(|e| Error::save(path, e))?;
        temp.as_file().sync_all().map_err(|e| Error::save(path, e))?;
        temp.persist(path).map_err(|e| Error::save(path, e.error))?;

        info!(path = %path.display(), objects = self.object_count(), "Saved project");
        Ok(())
    }

    fn objects(&self) -> &Dictionary {
        // Checked in `parse`; never removed afterwards.
        static EMPTY: Dictionary = Dictionary::new();
        self.root
            .get("objects")
            .and_then(Value::as_dict)
            .unwrap_or(&EMPTY)
    }

    fn objects_mut(&mut self) -> Result<&mut Dictionary> {
        self.root
            .get_mut("objects")
            .and_then(Value::as_dict_mut)
            .ok_or_else(|| Error::invalid_object("objects", "missing object table"))
    }

    /// Look up a group-like object.
    fn group(&self, id: &ObjectId) -> Result<&Dictionary> {
        let obj = self
            .object(id)
            .ok_or_else(|| Error::invalid_object(id.as_str(), "no such object"))?;
        let isa = obj.get("isa").and_then(Value::as_str).unwrap_or("");
        if !GROUP_ISAS.contains(&isa) {
            return Err(Error::invalid_object(
                id.as_str(),
                format!("expected a group, found {}", isa),
            ));
        }
        Ok(obj)
    }

    /// Derive an id from `seed` that is not yet used.
    fn allocate_id(&self, seed: &[&str]) -> ObjectId {
        let objects = self.objects();
        let mut attempt = 0;
        loop {
            let id = ObjectId::derive(seed, attempt);
            if !objects.contains_key(id.as_str()) {
                return id;
            }
            attempt += 1;
        }
    }

    fn insert_object(&mut self, id: &ObjectId, obj: Dictionary) -> Result<()> {
        self.objects_mut()?
            .insert(id.as_str().to_string(), Value::Dictionary(obj));
        Ok(())
    }

    /// Append `id` to the array `key` of object `owner`, creating the array
    /// if missing.
    fn push_id(&mut self, owner: &ObjectId, key: &str, id: &ObjectId) -> Result<()> {
        let obj = self
            .objects_mut()?
            .get_mut(owner.as_str())
            .and_then(Value::as_dict_mut)
            .ok_or_else(|| Error::invalid_object(owner.as_str(), "no such object"))?;
        let list = obj
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        let items = list.as_array_mut().ok_or_else(|| {
            Error::invalid_object(owner.as_str(), format!("{} is not an array", key))
        })?;
        items.push(Value::String(id.as_str().to_string()));
        Ok(())
    }

    /// The target's phase of kind `isa`, created and appended if missing.
    fn find_or_create_phase(&mut self, target: &ObjectId, isa: &str) -> Result<ObjectId> {
        let objects = self.objects();
        let target_obj = objects
            .get(target.as_str())
            .and_then(Value::as_dict)
            .ok_or_else(|| Error::invalid_object(target.as_str(), "no such target"))?;

        let existing = list_ids(target_obj, "buildPhases").find(|p| isa_of(objects, p) == Some(isa));
        if let Some(existing) = existing {
            return Ok(ObjectId::new(existing));
        }

        let id = self.allocate_id(&[isa, target.as_str()]);
        let mut phase = Dictionary::new();
        phase.insert("isa".into(), isa.into());
        phase.insert("buildActionMask".into(), BUILD_ACTION_MASK.into());
        phase.insert("files".into(), Value::Array(Vec::new()));
        phase.insert("runOnlyForDeploymentPostprocessing".into(), "0".into());

        self.insert_object(&id, phase)?;
        self.push_id(target, "buildPhases", &id)?;

        debug!(phase = %id, target = %target, isa, "Created build phase");
        Ok(id)
    }

    /// The build file in `phase` that references `file`, if any.
    fn build_file_in_phase(&self, phase: &ObjectId, file: &ObjectId) -> Option<ObjectId> {
        let objects = self.objects();
        let phase = objects.get(phase.as_str()).and_then(Value::as_dict)?;
        list_ids(phase, "files")
            .find(|bf| {
                objects
                    .get(*bf)
                    .and_then(Value::as_dict)
                    .and_then(|obj| obj.get("fileRef"))
                    .and_then(Value::as_str)
                    == Some(file.as_str())
            })
            .map(ObjectId::new)
    }
}

fn string_field(obj: &Dictionary, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// `Demo` for `.../Demo.xcodeproj/project.pbxproj`.
fn bundle_name(pbxproj: &Path) -> Option<String> {
    let bundle = pbxproj.parent()?;
    if bundle.extension()? != "xcodeproj" {
        return None;
    }
    bundle
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}
