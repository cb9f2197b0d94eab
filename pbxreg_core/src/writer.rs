//! Serialization in the layout Xcode itself writes.
//!
//! Xcode rewrites the whole file on every change. Matching its layout keeps
//! diffs produced by this crate limited to the objects that were added.

use crate::plist::{Dictionary, Value};
use std::collections::HashMap;
use std::fmt::Write;

/// Header line Xcode puts at the top of every project file.
pub const HEADER: &str = "// !$*UTF8*$!";

/// Object kinds written on a single line.
const INLINE_ISAS: &[&str] = &["PBXBuildFile", "PBXFileReference"];

/// Serialize a project's root dictionary.
///
/// `project_name` is used for the annotation of the project's own build
/// configuration list (Xcode takes it from the bundle name).
pub fn write_project(root: &Dictionary, project_name: Option<&str>) -> String {
    let empty = Dictionary::new();
    let objects = root
        .get("objects")
        .and_then(Value::as_dict)
        .unwrap_or(&empty);
    let annotations = Annotations::build(objects, project_name);
    let writer = Writer {
        objects,
        annotations: &annotations,
    };

    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    writer.write_root(&mut out, root);
    out
}

/// Serialize a standalone value (no annotations).
pub fn write_value(value: &Value) -> String {
    let empty = Dictionary::new();
    let annotations = Annotations::default();
    let writer = Writer {
        objects: &empty,
        annotations: &annotations,
    };
    let mut out = String::new();
    writer.write_value(&mut out, value, 0, None);
    out
}

/// Quote a string if the unquoted form would not read back the same.
pub fn quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | ':' | '.'))
        && !s.contains("//")
        && !s.contains("___");
    if plain {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\U{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Comments written after object ids (`ID /* comment */`).
#[derive(Debug, Default)]
struct Annotations(HashMap<String, String>);

impl Annotations {
    fn build(objects: &Dictionary, project_name: Option<&str>) -> Self {
        let mut map = HashMap::new();

        // Plain names first; build files and configuration lists refer to them.
        for (id, obj) in objects {
            let Some(obj) = obj.as_dict() else { continue };
            let isa = obj.get("isa").and_then(Value::as_str).unwrap_or("");
            if let Some(name) = Self::object_name(isa, obj) {
                map.insert(id.clone(), name);
            }
        }

        for (id, obj) in objects {
            let Some(obj) = obj.as_dict() else { continue };
            let isa = obj.get("isa").and_then(Value::as_str).unwrap_or("");

            // Build files: "<file> in <phase>".
            if isa.ends_with("BuildPhase") {
                let phase_name = map.get(id).cloned().unwrap_or_default();
                for file in list_ids(obj, "files") {
                    let file_name = objects
                        .get(file)
                        .and_then(Value::as_dict)
                        .and_then(|bf| {
                            bf.get("fileRef")
                                .or_else(|| bf.get("productRef"))
                                .and_then(Value::as_str)
                        })
                        .and_then(|r| map.get(r))
                        .cloned()
                        .unwrap_or_else(|| "(null)".to_string());
                    map.insert(file.to_string(), format!("{} in {}", file_name, phase_name));
                }
            }

            // Configuration lists: named after their owner.
            if let Some(list) = obj.get("buildConfigurationList").and_then(Value::as_str) {
                let owner = if isa == "PBXProject" {
                    project_name.unwrap_or("").to_string()
                } else {
                    obj.get("name")
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .to_string()
                };
                if isa_of(objects, list) == Some("XCConfigurationList") {
                    map.insert(
                        list.to_string(),
                        format!("Build configuration list for {} \"{}\"", isa, owner),
                    );
                }
            }
        }

        Annotations(map)
    }

    /// Display name of an object that does not depend on other objects.
    fn object_name(isa: &str, obj: &Dictionary) -> Option<String> {
        let field = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
        match isa {
            "PBXProject" => Some("Project object".to_string()),
            "PBXFileReference" | "PBXGroup" | "PBXVariantGroup" | "XCVersionGroup"
            | "PBXReferenceProxy" | "PBXFileSystemSynchronizedRootGroup" => {
                field("name").or_else(|| field("path"))
            }
            "PBXNativeTarget" | "PBXAggregateTarget" | "PBXLegacyTarget"
            | "XCBuildConfiguration" => field("name"),
            "PBXSourcesBuildPhase" => field("name").or(Some("Sources".to_string())),
            "PBXHeadersBuildPhase" => field("name").or(Some("Headers".to_string())),
            "PBXResourcesBuildPhase" => field("name").or(Some("Resources".to_string())),
            "PBXFrameworksBuildPhase" => field("name").or(Some("Frameworks".to_string())),
            "PBXCopyFilesBuildPhase" => field("name").or(Some("CopyFiles".to_string())),
            "PBXShellScriptBuildPhase" => field("name").or(Some("ShellScript".to_string())),
            "PBXRezBuildPhase" => field("name").or(Some("Rez".to_string())),
            "PBXContainerItemProxy" | "PBXTargetDependency" => Some(isa.to_string()),
            "XCSwiftPackageProductDependency" => field("productName"),
            "XCRemoteSwiftPackageReference" => field("repositoryURL")
                .map(|url| format!("{} \"{}\"", isa, package_name(&url))),
            "XCLocalSwiftPackageReference" => field("relativePath")
                .map(|path| format!("{} \"{}\"", isa, path)),
            _ => None,
        }
    }

    fn get(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }
}

/// Last path component of a package URL, without `.git`.
fn package_name(url: &str) -> &str {
    let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    last.strip_suffix(".git").unwrap_or(last)
}

/// Keys whose values look like object ids but are never annotated.
const UNANNOTATED_KEYS: &[&str] = &["remoteGlobalIDString", "TestTargetID"];

/// The `isa` of the object stored under `id`.
pub(crate) fn isa_of<'a>(objects: &'a Dictionary, id: &str) -> Option<&'a str> {
    objects
        .get(id)
        .and_then(Value::as_dict)
        .and_then(|obj| obj.get("isa"))
        .and_then(Value::as_str)
}

/// Ids listed in an array field of an object.
pub(crate) fn list_ids<'a>(obj: &'a Dictionary, key: &str) -> impl Iterator<Item = &'a str> {
    obj.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

struct Writer<'a> {
    objects: &'a Dictionary,
    annotations: &'a Annotations,
}

impl Writer<'_> {
    fn write_root(&self, out: &mut String, root: &Dictionary) {
        out.push_str("{\n");
        for (key, value) in root {
            indent(out, 1);
            let _ = write!(out, "{} = ", quote(key));
            if key == "objects" {
                match value.as_dict() {
                    Some(objects) => self.write_objects(out, objects),
                    None => self.write_value(out, value, 1, Some(key.as_str())),
                }
            } else {
                self.write_value(out, value, 1, Some(key.as_str()));
            }
            out.push_str(";\n");
        }
        out.push_str("}\n");
    }

    /// The object table, grouped by `isa` into sections.
    fn write_objects(&self, out: &mut String, objects: &Dictionary) {
        let mut sections: Vec<(&str, Vec<(&String, &Value)>)> = Vec::new();
        for (id, obj) in objects {
            let isa = obj
                .as_dict()
                .and_then(|o| o.get("isa"))
                .and_then(Value::as_str)
                .unwrap_or("");
            match sections.iter_mut().find(|(name, _)| *name == isa) {
                Some((_, entries)) => entries.push((id, obj)),
                None => sections.push((isa, vec![(id, obj)])),
            }
        }
        sections.sort_by(|a, b| a.0.cmp(b.0));

        out.push_str("{\n");
        for (isa, entries) in sections {
            let _ = writeln!(out, "\n/* Begin {} section */", isa);
            for (id, obj) in entries {
                indent(out, 2);
                self.write_reference(out, id);
                out.push_str(" = ");
                match obj.as_dict() {
                    Some(dict) if INLINE_ISAS.contains(&isa) => self.write_inline_dict(out, dict),
                    Some(dict) => self.write_dict(out, dict, 2),
                    None => self.write_value(out, obj, 2, None),
                }
                out.push_str(";\n");
            }
            let _ = writeln!(out, "/* End {} section */", isa);
        }
        indent(out, 1);
        out.push('}');
    }

    fn write_value(&self, out: &mut String, value: &Value, depth: usize, key: Option<&str>) {
        match value {
            Value::String(s) => self.write_string(out, s, key),
            Value::Array(items) => {
                out.push_str("(\n");
                for item in items {
                    indent(out, depth + 1);
                    self.write_value(out, item, depth + 1, None);
                    out.push_str(",\n");
                }
                indent(out, depth);
                out.push(')');
            }
            Value::Dictionary(dict) => self.write_dict(out, dict, depth),
        }
    }

    fn write_dict(&self, out: &mut String, dict: &Dictionary, depth: usize) {
        out.push_str("{\n");
        for (key, value) in ordered(dict) {
            indent(out, depth + 1);
            let _ = write!(out, "{} = ", quote(key));
            self.write_value(out, value, depth + 1, Some(key.as_str()));
            out.push_str(";\n");
        }
        indent(out, depth);
        out.push('}');
    }

    fn write_inline_value(&self, out: &mut String, value: &Value, key: Option<&str>) {
        match value {
            Value::String(s) => self.write_string(out, s, key),
            Value::Array(items) => {
                out.push('(');
                for item in items {
                    self.write_inline_value(out, item, None);
                    out.push_str(", ");
                }
                out.push(')');
            }
            Value::Dictionary(dict) => self.write_inline_dict(out, dict),
        }
    }

    fn write_inline_dict(&self, out: &mut String, dict: &Dictionary) {
        out.push('{');
        for (key, value) in ordered(dict) {
            let _ = write!(out, "{} = ", quote(key));
            self.write_inline_value(out, value, Some(key.as_str()));
            out.push_str("; ");
        }
        out.push('}');
    }

    fn write_string(&self, out: &mut String, s: &str, key: Option<&str>) {
        let annotated = !key.is_some_and(|key| UNANNOTATED_KEYS.contains(&key));
        if annotated && self.objects.contains_key(s) {
            self.write_reference(out, s);
        } else {
            out.push_str(&quote(s));
        }
    }

    fn write_reference(&self, out: &mut String, id: &str) {
        out.push_str(&quote(id));
        if let Some(comment) = self.annotations.get(id) {
            // A name containing "*/" would end the comment early.
            let _ = write!(out, " /* {} */", comment.replace("*/", "(*)/"));
        }
    }
}

/// Dictionary entries with `isa` first, the rest in key order.
fn ordered(dict: &Dictionary) -> impl Iterator<Item = (&String, &Value)> {
    let isa = dict.get_key_value("isa");
    isa.into_iter()
        .chain(dict.iter().filter(|(key, _)| key.as_str() != "isa"))
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}
