//! File type detection by extension.

/// `lastKnownFileType` used when the extension is not recognised.
pub const DEFAULT_FILE_TYPE: &str = "text";

/// Extensions whose files belong in a target's headers phase.
const HEADER_EXTENSIONS: &[&str] = &[
    "h", "hh", "hpp", "hxx", "ipp", "pch", "def", "tpp", "inl", "inc",
];

const FILE_TYPES: &[(&str, &str)] = &[
    ("a", "archive.ar"),
    ("app", "wrapper.application"),
    ("bundle", "wrapper.plug-in"),
    ("c", "sourcecode.c.c"),
    ("cc", "sourcecode.cpp.cpp"),
    ("cpp", "sourcecode.cpp.cpp"),
    ("css", "text.css"),
    ("cxx", "sourcecode.cpp.cpp"),
    ("dylib", "compiled.mach-o.dylib"),
    ("framework", "wrapper.framework"),
    ("h", "sourcecode.c.h"),
    ("hh", "sourcecode.cpp.h"),
    ("hpp", "sourcecode.cpp.h"),
    ("html", "text.html"),
    ("intentdefinition", "file.intentdefinition"),
    ("js", "sourcecode.javascript"),
    ("json", "text.json"),
    ("m", "sourcecode.c.objc"),
    ("markdown", "net.daringfireball.markdown"),
    ("md", "net.daringfireball.markdown"),
    ("metal", "sourcecode.metal"),
    ("mm", "sourcecode.cpp.objcpp"),
    ("modulemap", "sourcecode.module"),
    ("pch", "sourcecode.c.h"),
    ("plist", "text.plist.xml"),
    ("png", "image.png"),
    ("sh", "text.script.sh"),
    ("storyboard", "file.storyboard"),
    ("strings", "text.plist.strings"),
    ("swift", "sourcecode.swift"),
    ("tbd", "sourcecode.text-based-dylib-definition"),
    ("xcassets", "folder.assetcatalog"),
    ("xcconfig", "text.xcconfig"),
    ("xcdatamodel", "wrapper.xcdatamodel"),
    ("xib", "file.xib"),
    ("xml", "text.xml"),
    ("yaml", "text.yaml"),
    ("yml", "text.yaml"),
];

/// Lowercased extension of a file name, without the dot.
fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// The `lastKnownFileType` Xcode would assign to a file name.
pub fn last_known_file_type(file_name: &str) -> &'static str {
    extension(file_name)
        .and_then(|ext| {
            FILE_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, file_type)| *file_type)
        })
        .unwrap_or(DEFAULT_FILE_TYPE)
}

/// True if the file belongs in the headers phase rather than sources.
pub fn is_header(file_name: &str) -> bool {
    extension(file_name).is_some_and(|ext| HEADER_EXTENSIONS.contains(&ext.as_str()))
}
