/// File categorization by extension.
///
/// This module maps lowercased file extensions (including the leading dot)
/// to the four fixed categories a directory is sorted into.
///
/// # Examples
///
/// ```
/// use dirsort::category::{Category, ExtensionMap};
///
/// let map = ExtensionMap::default();
/// assert_eq!(map.category_for_name("photo.JPG"), Category::Images);
/// assert_eq!(map.category_for_name("song.mp3"), Category::Audios);
/// assert_eq!(map.category_for_name("archive.xyz"), Category::Unknown);
/// ```
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A file category, represented on disk as a subdirectory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Image files (PNG, JPG, ...)
    Images,
    /// Audio files (MP3, WAV, ...)
    Audios,
    /// Document files (TXT, DOCX, ...)
    Documents,
    /// Anything without a known extension
    Unknown,
}

impl Category {
    /// Every category, in the order their directories are created.
    pub const ALL: [Category; 4] = [
        Category::Images,
        Category::Audios,
        Category::Documents,
        Category::Unknown,
    ];

    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsort::category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "images");
    /// assert_eq!(Category::Unknown.dir_name(), "unknown");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "images",
            Category::Audios => "audios",
            Category::Documents => "documents",
            Category::Unknown => "unknown",
        }
    }

    /// Returns the category whose directory name is exactly `name`.
    ///
    /// Matching is case-sensitive: `Images` is an ordinary directory.
    pub fn from_dir_name(name: &str) -> Option<Category> {
        Self::ALL.into_iter().find(|c| c.dir_name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Returns true if `name` is the base name of a category directory.
pub fn is_category_dir_name(name: &str) -> bool {
    Category::from_dir_name(name).is_some()
}

/// Returns the lowercased extension of a file name, including the dot.
///
/// The extension is everything from the last `.` of the name, so a dot-file
/// such as `.bashrc` is its own extension and a name without a dot has an
/// empty one.
///
/// # Examples
///
/// ```
/// use dirsort::category::extension_of;
///
/// assert_eq!(extension_of("photo.JPG"), ".jpg");
/// assert_eq!(extension_of("archive.tar.gz"), ".gz");
/// assert_eq!(extension_of("README"), "");
/// ```
pub fn extension_of(file_name: &str) -> String {
    file_name
        .rfind('.')
        .map(|idx| file_name[idx..].to_lowercase())
        .unwrap_or_default()
}

/// Immutable extension-to-category table.
///
/// Built once and handed to the walker. Unmapped extensions, including the
/// empty one, resolve to [`Category::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMap {
    extension_map: HashMap<String, Category>,
}

impl ExtensionMap {
    /// Creates a table with no mappings; every file resolves to `Unknown`.
    pub fn empty() -> Self {
        Self {
            extension_map: HashMap::new(),
        }
    }

    /// Creates a table from `(extension, category)` pairs.
    ///
    /// Extensions are normalised with [`normalize_extension`].
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Category)>,
        S: AsRef<str>,
    {
        let mut map = Self::empty();
        for (ext, category) in pairs {
            map.insert(ext.as_ref(), category);
        }
        map
    }

    /// Returns a copy of this table with an extra mapping.
    pub fn with_mapping(mut self, ext: &str, category: Category) -> Self {
        self.insert(ext, category);
        self
    }

    pub(crate) fn insert(&mut self, ext: &str, category: Category) {
        self.extension_map.insert(normalize_extension(ext), category);
    }

    /// Maps an extension to a category, if it is in the table.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsort::category::{Category, ExtensionMap};
    ///
    /// let map = ExtensionMap::default();
    /// assert_eq!(map.lookup(".PNG"), Some(Category::Images));
    /// assert_eq!(map.lookup(".pdf"), None);
    /// ```
    pub fn lookup(&self, ext: &str) -> Option<Category> {
        self.extension_map.get(&ext.to_lowercase()).copied()
    }

    /// Maps an extension to a category, defaulting to `Unknown`.
    pub fn category_for_extension(&self, ext: &str) -> Category {
        self.lookup(ext).unwrap_or(Category::Unknown)
    }

    /// Classifies a file by its name.
    pub fn category_for_name(&self, file_name: &str) -> Category {
        self.category_for_extension(&extension_of(file_name))
    }

    /// Number of mapped extensions.
    pub fn len(&self) -> usize {
        self.extension_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extension_map.is_empty()
    }
}

impl Default for ExtensionMap {
    fn default() -> Self {
        Self::from_pairs([
            (".png", Category::Images),
            (".jpg", Category::Images),
            (".jpeg", Category::Images),
            (".mp3", Category::Audios),
            (".wav", Category::Audios),
            (".txt", Category::Documents),
            (".docx", Category::Documents),
        ])
    }
}

/// Lowercases an extension and adds the leading dot if it is missing.
pub fn normalize_extension(ext: &str) -> String {
    let lower = ext.trim().to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}
