//! Line-art gallery on the file system
//!
//! Categories are the subdirectories of `static/line_art`; their images are
//! the files with a known image extension. Nothing is cached, every listing
//! reads the directory again.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;
use tracing::info;
use unicode_normalization::UnicodeNormalization;

use crate::images::static_url;

/// Subdirectory of the static tree holding line-art categories
pub const LINE_ART_DIR: &str = "line_art";

/// Subdirectory of the static tree holding saved artworks
pub const UPLOAD_DIR: &str = "user_artworks";

/// Subdirectory of the static tree holding background music
pub const SOUNDS_DIR: &str = "sounds";

/// Category receiving converted uploads
pub const AI_CATEGORY: &str = "ai_generated";

/// Categories created at startup
pub const DEFAULT_CATEGORIES: &[&str] = &["mandalas", "animals", "nature", AI_CATEGORY];

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Characters kept by `secure_filename`
static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").unwrap());

/// Category name -> sorted image filenames
pub type Categories = BTreeMap<String, Vec<String>>;

/// Image featured on a given day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyImage {
    pub category: String,
    pub filename: String,
}

impl DailyImage {
    /// Placeholder used while the gallery is empty
    pub fn placeholder() -> Self {
        Self {
            category: "default".to_string(),
            filename: "default.png".to_string(),
        }
    }

    pub fn url(&self) -> String {
        line_art_url(&self.category, &self.filename)
    }
}

/// Public URL of a line-art image
pub fn line_art_url(category: &str, filename: &str) -> String {
    static_url(&format!("{}/{}/{}", LINE_ART_DIR, category, filename))
}

/// Create the static directory layout
pub async fn bootstrap(static_dir: &Path) -> io::Result<()> {
    let line_art = static_dir.join(LINE_ART_DIR);
    for category in DEFAULT_CATEGORIES {
        tokio::fs::create_dir_all(line_art.join(category)).await?;
    }
    tokio::fs::create_dir_all(static_dir.join(UPLOAD_DIR)).await?;
    tokio::fs::create_dir_all(static_dir.join(SOUNDS_DIR)).await?;

    info!("Static directories ready under {}", static_dir.display());
    Ok(())
}

fn is_image(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// List categories that contain at least one image
///
/// A missing line-art directory yields an empty gallery.
pub async fn list_categories(line_art_dir: &Path) -> io::Result<Categories> {
    let mut categories = Categories::new();

    let mut dirs = match tokio::fs::read_dir(line_art_dir).await {
        Ok(dirs) => dirs,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(categories),
        Err(e) => return Err(e),
    };

    while let Some(dir) = dirs.next_entry().await? {
        if !dir.file_type().await?.is_dir() {
            continue;
        }
        let Some(category) = dir.file_name().to_str().map(String::from) else {
            continue;
        };

        let mut images = Vec::new();
        let mut files = tokio::fs::read_dir(dir.path()).await?;
        while let Some(file) = files.next_entry().await? {
            if let Some(name) = file.file_name().to_str() {
                if file.file_type().await?.is_file() && is_image(name) {
                    images.push(name.to_string());
                }
            }
        }

        if !images.is_empty() {
            images.sort();
            categories.insert(category, images);
        }
    }

    Ok(categories)
}

/// Pick the featured image for `date`
///
/// Images are flattened in category order and indexed by
/// `(year + month + day) % count`.
pub fn daily_image(categories: &Categories, date: NaiveDate) -> DailyImage {
    let all: Vec<(&String, &String)> = categories
        .iter()
        .flat_map(|(category, images)| images.iter().map(move |image| (category, image)))
        .collect();

    if all.is_empty() {
        return DailyImage::placeholder();
    }

    let seed = i64::from(date.year()) + i64::from(date.month()) + i64::from(date.day());
    let (category, filename) = all[seed.rem_euclid(all.len() as i64) as usize];

    DailyImage {
        category: category.clone(),
        filename: filename.clone(),
    }
}

/// Reduce a user-supplied name to a safe single path component
///
/// The name is NFKD-normalized so accented letters keep their base letter,
/// remaining non-ASCII characters are dropped, separators become `_`, and leading or
/// trailing dots and underscores are stripped. The result may be empty.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = DISALLOWED_CHARS.replace_all(&joined, "");

    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("i contain cool \u{fc}ml\u{e4}uts.txt"), "i_contain_cool_umlauts.txt");
        assert_eq!(secure_filename("caf\u{e9} \u{fb01}sh.png"), "cafe_fish.png");
        assert_eq!(secure_filename("owl.png"), "owl.png");
        assert_eq!(secure_filename("..\\..\\win.png"), "win.png");
        assert_eq!(secure_filename("../.."), "");
        assert_eq!(secure_filename(""), "");
    }

    #[test]
    fn test_is_image() {
        assert!(is_image("a.png"));
        assert!(is_image("b.JPEG"));
        assert!(is_image("c.gif"));
        assert!(!is_image("d.txt"));
        assert!(!is_image("png"));
    }

    #[tokio::test]
    async fn test_bootstrap_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        bootstrap(dir.path()).await.unwrap();

        for category in DEFAULT_CATEGORIES {
            assert!(dir.path().join(LINE_ART_DIR).join(category).is_dir());
        }
        assert!(dir.path().join(UPLOAD_DIR).is_dir());
        assert!(dir.path().join(SOUNDS_DIR).is_dir());

        // Idempotent
        bootstrap(dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_categories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(LINE_ART_DIR);
        touch(&root.join("animals/owl.png"));
        touch(&root.join("animals/cat.JPG"));
        touch(&root.join("animals/notes.txt"));
        touch(&root.join("nature/tree.gif"));
        std::fs::create_dir_all(root.join("empty")).unwrap();
        touch(&root.join("stray.png"));

        let categories = list_categories(&root).await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories["animals"], vec!["cat.JPG", "owl.png"]);
        assert_eq!(categories["nature"], vec!["tree.gif"]);
        assert!(!categories.contains_key("empty"));
    }

    #[tokio::test]
    async fn test_list_categories_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let categories = list_categories(&dir.path().join("nope")).await.unwrap();
        assert!(categories.is_empty());
    }

    #[test]
    fn test_daily_image() {
        let mut categories = Categories::new();
        categories.insert("animals".into(), vec!["cat.png".into(), "owl.png".into()]);
        categories.insert("nature".into(), vec!["tree.png".into()]);

        // 2026 + 10 + 16 = 2052, 2052 % 3 = 0
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let daily = daily_image(&categories, date);
        assert_eq!(daily.category, "animals");
        assert_eq!(daily.filename, "cat.png");

        // 2026 + 10 + 17 = 2053, 2053 % 3 = 1
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(daily_image(&categories, date).filename, "owl.png");

        // Same day, same pick
        assert_eq!(daily_image(&categories, date), daily_image(&categories, date));
        assert_eq!(
            daily_image(&categories, date).url(),
            "/static/line_art/animals/owl.png"
        );
    }

    #[test]
    fn test_daily_image_empty_gallery() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let daily = daily_image(&Categories::new(), date);
        assert_eq!(daily, DailyImage::placeholder());
        assert_eq!(daily.url(), "/static/line_art/default/default.png");
    }
}
