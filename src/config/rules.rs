//! Document rewrite rules applied to every synthesized configuration.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::ConfigError;
use super::document::{ConfigDocument, Element};

/// Expected name of the document root.
pub const ROOT_ELEMENT: &str = "phpunit";

/// Check the structural precondition: the root must be `<phpunit>`.
pub fn validate(document: &ConfigDocument) -> Result<(), ConfigError> {
    let name = document.root().name();
    if name != ROOT_ELEMENT {
        return Err(ConfigError::Invalid(format!(
            "expected root element `{ROOT_ELEMENT}`, found `{name}`"
        )));
    }
    Ok(())
}

/// Rewrite relative paths to absolute ones rooted at `base_dir`.
///
/// Covers the root `bootstrap` attribute and the text of every `directory`,
/// `file` and `testsuite/exclude` element.
pub fn replace_with_absolute_paths(document: &mut ConfigDocument, base_dir: &Path) {
    let root = document.root_mut();
    if let Some(bootstrap) = root.attribute("bootstrap") {
        let absolute = absolutize(base_dir, bootstrap);
        root.set_attribute("bootstrap", absolute);
    }
    rewrite_path_elements(root, None, base_dir);
}

fn rewrite_path_elements(element: &mut Element, parent: Option<&str>, base_dir: &Path) {
    let holds_path = matches!(element.name(), "directory" | "file")
        || (element.name() == "exclude" && parent == Some("testsuite"));

    if holds_path {
        let text = element.text();
        if !text.trim().is_empty() {
            let absolute = absolutize(base_dir, &text);
            element.set_text(absolute);
        }
    }

    let name = element.name().to_string();
    for child in element.children_mut() {
        rewrite_path_elements(child, Some(&name), base_dir);
    }
}

fn absolutize(base_dir: &Path, raw: &str) -> String {
    let trimmed = raw.trim();
    let path = Path::new(trimmed);
    if path.is_absolute() {
        return trimmed.to_string();
    }
    normalize(&base_dir.join(path)).display().to_string()
}

/// Resolve `.` and `..` lexically, without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Force `stopOnFailure="true"` on the root.
pub fn set_stop_on_failure(document: &mut ConfigDocument) {
    document.root_mut().set_attribute("stopOnFailure", "true");
}

/// Force `colors="false"` on the root.
pub fn deactivate_colors(document: &mut ConfigDocument) {
    document.root_mut().set_attribute("colors", "false");
}

/// Drop every `<logging>` block so only synthesized loggers remain.
pub fn remove_existing_loggers(document: &mut ConfigDocument) {
    let removed = document.root_mut().remove_children("logging");
    if removed > 0 {
        debug!(removed, "removed existing logging blocks");
    }
}

/// Drop a custom result printer.
pub fn remove_existing_printers(document: &mut ConfigDocument) {
    if let Some(printer) = document.root_mut().remove_attribute("printerClass") {
        debug!(%printer, "removed existing printer class");
    }
}
