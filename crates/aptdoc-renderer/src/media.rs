//! Screencast and image embedding.
//!
//! Media is discovered on disk below the site resources directory:
//!
//! ```text
//! {resources}/
//! +-- screencasts/           # <id>.ogg, <id>.mp4, <id>.webm
//! +-- <any>/<dir>/           # images referenced by ~~{images:/<any>/<dir>}
//! +-- generated/snippets/    # screencast_snippet_<id>.txt (written here)
//! ```

use std::ffi::OsStr;
use std::fmt::Write;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::keys::ReplacementMap;
use crate::substitute::{PLACEHOLDER, substitute_placeholders};

/// Video formats offered for every embedded screencast, in probe order.
pub const SUPPORTED_VIDEO_TYPES: [&str; 3] = ["ogg", "mp4", "webm"];

/// Output emitted when a directive finds no media.
pub const NOT_AVAILABLE: &str = "\n\n  n/a";

/// Extensions treated as images regardless of the MIME database.
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "tif", "jpg", "jpeg", "bmp"];

/// Colon-prefixed directory path inside a resolved images directive.
static DIRECTORY_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(/*[\w\-\s]+/*)+").unwrap());

/// Resolves media directives against a site resources directory.
#[derive(Clone, Debug)]
pub struct MediaEmbedder {
    resources_dir: PathBuf,
}

impl MediaEmbedder {
    /// Create an embedder rooted at `resources_dir`.
    pub fn new(resources_dir: impl Into<PathBuf>) -> Self {
        Self {
            resources_dir: resources_dir.into(),
        }
    }

    /// Site resources directory.
    #[must_use]
    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }

    /// Location of the cached video markup for a screencast.
    #[must_use]
    pub fn snippet_path(&self, identifier: &str) -> PathBuf {
        self.resources_dir
            .join("generated")
            .join("snippets")
            .join(format!("screencast_snippet_{identifier}.txt"))
    }

    /// Whether a recording exists for `identifier` in any supported format.
    #[must_use]
    pub fn screencast_exists(&self, identifier: &str) -> bool {
        if identifier.is_empty() {
            return false;
        }
        let dir = self.resources_dir.join("screencasts");
        SUPPORTED_VIDEO_TYPES
            .iter()
            .any(|ext| dir.join(format!("{identifier}.{ext}")).exists())
    }

    /// Resolve a screencast directive.
    ///
    /// Writes the video markup to the snippet cache and returns an APT
    /// snippet macro referencing it, or [`NOT_AVAILABLE`] if no recording
    /// exists or the snippet cannot be written.
    #[must_use]
    pub fn embed_screencast(&self, directive: &str, replacements: &ReplacementMap) -> String {
        let identifier = screencast_identifier(directive, replacements);

        if !self.screencast_exists(identifier) {
            tracing::debug!(identifier, "no screencast recorded");
            return NOT_AVAILABLE.to_owned();
        }

        match self.write_snippet(identifier) {
            Ok(path) => format!(
                "\n\n%{{snippet|verbatim=false|file={}}}",
                path.display()
            ),
            Err(e) => {
                tracing::warn!(identifier, "failed to write screencast snippet: {e}");
                NOT_AVAILABLE.to_owned()
            }
        }
    }

    /// Resolve an images directive.
    ///
    /// Emits one APT figure reference per image in the referenced directory,
    /// sorted by file name, or [`NOT_AVAILABLE`] if there are none.
    #[must_use]
    pub fn embed_images(&self, directive: &str, replacements: &ReplacementMap) -> String {
        let resolved = substitute_placeholders(directive, replacements, false);
        let raw_path = DIRECTORY_PATH
            .find(&resolved)
            .map(|m| m.as_str().replace(':', ""))
            .unwrap_or_default();
        let relative = raw_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");

        let images = list_images(&self.resources_dir.join(&relative));
        if images.is_empty() {
            return NOT_AVAILABLE.to_owned();
        }

        let mut out = String::from("\n\n");
        for name in images {
            if relative.is_empty() {
                let _ = write!(out, "\n\n[/{name}]");
            } else {
                let _ = write!(out, "\n\n[/{relative}/{name}]");
            }
        }
        out
    }

    fn write_snippet(&self, identifier: &str) -> io::Result<PathBuf> {
        let path = self.snippet_path(identifier);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, video_markup(identifier))?;
        Ok(path)
    }
}

/// Value of the last placeholder in a screencast directive.
fn screencast_identifier<'a>(directive: &str, replacements: &'a ReplacementMap) -> &'a str {
    PLACEHOLDER
        .captures_iter(directive)
        .last()
        .map_or("", |caps| replacements.get(&caps[1]))
}

/// HTML5 video element offering every supported format.
fn video_markup(identifier: &str) -> String {
    let mut html = String::from("<video width=\"800\" controls>");
    for ext in SUPPORTED_VIDEO_TYPES {
        let _ = write!(
            html,
            "<source src=\"/screencasts/{identifier}.{ext}\" type=\"video/{ext}\">"
        );
    }
    html.push_str("Your Browser does not support the video tag.");
    html.push_str("</video>");
    html
}

/// Sorted names of the image files in `dir`; empty if `dir` is unreadable.
fn list_images(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), "images directory not readable: {e}");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if !path.is_file() {
                return None;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_image(&path) {
                Some(name)
            } else {
                tracing::debug!("{name} has an unsupported file type, skipping");
                None
            }
        })
        .collect();
    names.sort();
    names
}

fn is_image(path: &Path) -> bool {
    let known = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        });
    known
        || mime_guess::from_path(path)
            .first()
            .is_some_and(|mime| mime.type_() == mime_guess::mime::IMAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn replacements(pairs: &[(&str, &str)]) -> ReplacementMap {
        pairs.iter().copied().collect()
    }

    fn resources_with(files: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for file in files {
            let path = tmp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"data").unwrap();
        }
        tmp
    }

    #[test]
    fn test_screencast_available() {
        let tmp = resources_with(&["screencasts/demo.ogg"]);
        let embedder = MediaEmbedder::new(tmp.path());

        let output = embedder.embed_screencast(
            "~~{screencast:screencasts/${id}",
            &replacements(&[("id", "demo")]),
        );

        let snippet = embedder.snippet_path("demo");
        assert_eq!(
            output.trim(),
            format!("%{{snippet|verbatim=false|file={}}}", snippet.display())
        );
        assert!(output.contains("generated/snippets/screencast_snippet_demo.txt"));

        let markup = fs::read_to_string(&snippet).unwrap();
        for ext in SUPPORTED_VIDEO_TYPES {
            assert!(
                markup.contains(&format!(
                    "<source src=\"/screencasts/demo.{ext}\" type=\"video/{ext}\">"
                )),
                "missing {ext} source in {markup}"
            );
        }
    }

    #[test]
    fn test_screencast_snippet_write_failure() {
        let tmp = resources_with(&["screencasts/demo.ogg", "generated/snippets"]);
        let embedder = MediaEmbedder::new(tmp.path());
        assert_eq!(embedder.resources_dir(), tmp.path());

        let output = embedder.embed_screencast(
            "~~{screencast:screencasts/${id}",
            &replacements(&[("id", "demo")]),
        );

        assert_eq!(output, NOT_AVAILABLE);
        assert!(tmp.path().join("generated/snippets").is_file());
    }

    #[test]
    fn test_screencast_any_supported_extension() {
        let tmp = resources_with(&["screencasts/clip.webm"]);
        let embedder = MediaEmbedder::new(tmp.path());
        assert!(embedder.screencast_exists("clip"));
        assert!(!embedder.screencast_exists("other"));
    }

    #[test]
    fn test_screencast_not_available() {
        let tmp = resources_with(&["screencasts/demo.ogg"]);
        let embedder = MediaEmbedder::new(tmp.path());

        let output = embedder.embed_screencast(
            "~~{screencast:screencasts/${id}",
            &replacements(&[("id", "nothing")]),
        );

        assert_eq!(output.trim(), "n/a");
        assert!(!embedder.snippet_path("nothing").exists());
    }

    #[test]
    fn test_screencast_missing_identifier() {
        let tmp = resources_with(&["screencasts/.ogg"]);
        let embedder = MediaEmbedder::new(tmp.path());
        let output = embedder.embed_screencast("~~{screencast:${id}", &ReplacementMap::new());
        assert_eq!(output.trim(), "n/a");
    }

    #[test]
    fn test_screencast_snippet_overwritten() {
        let tmp = resources_with(&["screencasts/demo.mp4"]);
        let embedder = MediaEmbedder::new(tmp.path());
        let snippet = embedder.snippet_path("demo");
        fs::create_dir_all(snippet.parent().unwrap()).unwrap();
        fs::write(&snippet, "stale").unwrap();

        let _ = embedder.embed_screencast("~~{screencast:${id}", &replacements(&[("id", "demo")]));

        assert_eq!(fs::read_to_string(&snippet).unwrap(), video_markup("demo"));
    }

    #[test]
    fn test_images_only_images() {
        let tmp = resources_with(&["images/test/duke.png", "images/test/not_an_image.txt"]);
        let embedder = MediaEmbedder::new(tmp.path());

        let output = embedder.embed_images("~~{images:/images/test}", &ReplacementMap::new());

        assert_eq!(output.trim(), "[/images/test/duke.png]");
        assert!(!output.contains("not_an_image.txt"));
    }

    #[test]
    fn test_images_placeholder_in_path() {
        let tmp = resources_with(&["images/test/duke.png"]);
        let embedder = MediaEmbedder::new(tmp.path());

        let output = embedder.embed_images(
            "~~{images:/images/${param}}",
            &replacements(&[("param", "test")]),
        );

        assert!(output.contains("duke.png"));
    }

    #[test]
    fn test_images_sorted_by_name() {
        let tmp = resources_with(&["shots/b.png", "shots/a.png", "shots/c.JPG"]);
        let embedder = MediaEmbedder::new(tmp.path());

        let output = embedder.embed_images("~~{images:/shots}", &ReplacementMap::new());

        assert_eq!(
            output,
            "\n\n\n\n[/shots/a.png]\n\n[/shots/b.png]\n\n[/shots/c.JPG]"
        );
    }

    #[test]
    fn test_images_standard_image_type() {
        let tmp = resources_with(&["shots/anim.gif"]);
        let embedder = MediaEmbedder::new(tmp.path());
        let output = embedder.embed_images("~~{images:/shots}", &ReplacementMap::new());
        assert_eq!(output.trim(), "[/shots/anim.gif]");
    }

    #[test]
    fn test_images_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let embedder = MediaEmbedder::new(tmp.path());

        let output = embedder.embed_images(
            "~~{images:/images/${param}}",
            &replacements(&[("param", "empty")]),
        );

        assert_eq!(output.trim(), "n/a");
    }

    #[test]
    fn test_images_no_images_after_filtering() {
        let tmp = resources_with(&["images/docs/readme.txt"]);
        let embedder = MediaEmbedder::new(tmp.path());
        let output = embedder.embed_images("~~{images:/images/docs}", &ReplacementMap::new());
        assert_eq!(output.trim(), "n/a");
    }

    #[test]
    fn test_images_skip_subdirectories() {
        let tmp = resources_with(&["images/nested/inner/a.png", "images/nested/top.png"]);
        let embedder = MediaEmbedder::new(tmp.path());
        let output = embedder.embed_images("~~{images:/images/nested}", &ReplacementMap::new());
        assert_eq!(output.trim(), "[/images/nested/top.png]");
    }
}
