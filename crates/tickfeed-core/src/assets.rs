//! Static asset sources.
//!
//! Assets come either from a directory on disk (dev mode) or from the
//! `static/` tree embedded into the binary at build time. Both sources share
//! the same path rules so a given request resolves to the same bytes in
//! either mode. A directory without an index file resolves to a generated
//! HTML listing of its entries.

use crate::error::AssetError;
use crate::Result;
use bytes::Bytes;
use mime_guess::{mime, Mime};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File served for directory requests.
pub const INDEX_FILE: &str = "index.html";

/// Bytes escaped when a segment is written back into a URL path.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b':')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

#[derive(RustEmbed)]
#[folder = "../../static/"]
struct EmbeddedStatic;

/// Which asset source the server reads from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssetMode {
    /// Read files from disk on every request.
    Filesystem,
    /// Serve the tree compiled into the binary.
    #[default]
    Bundled,
}

impl AssetMode {
    pub fn from_dev_flag(dev: bool) -> Self {
        if dev {
            AssetMode::Filesystem
        } else {
            AssetMode::Bundled
        }
    }
}

impl fmt::Display for AssetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetMode::Filesystem => write!(f, "filesystem"),
            AssetMode::Bundled => write!(f, "bundled"),
        }
    }
}

/// A resolved static file or directory listing.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Path relative to the asset root, `/`-separated. Listings end in `/`.
    pub path: String,
    pub data: Bytes,
    pub mime: Mime,
}

impl Asset {
    fn new(path: String, data: Bytes) -> Self {
        let mime = mime_guess::from_path(&path).first_or_octet_stream();
        Self { path, data, mime }
    }

    fn listing(path: String, entries: &BTreeMap<String, bool>) -> Self {
        Self {
            path,
            data: Bytes::from(render_listing(entries)),
            mime: mime::TEXT_HTML_UTF_8,
        }
    }

    /// Value for the `Content-Type` header. Text types are declared UTF-8.
    pub fn content_type(&self) -> String {
        let is_text = self.mime.type_() == mime::TEXT;
        if is_text && self.mime.get_param(mime::CHARSET).is_none() {
            format!("{}; charset=utf-8", self.mime)
        } else {
            self.mime.to_string()
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Directory entries keyed by name, `true` for subdirectories.
fn render_listing(entries: &BTreeMap<String, bool>) -> String {
    let mut html = String::from(
        "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
    );
    for (name, is_dir) in entries {
        let slash = if *is_dir { "/" } else { "" };
        let href = format!("{}{slash}", utf8_percent_encode(name, PATH_SEGMENT));
        html.push_str(&format!(
            "<a href=\"{}\">{}{slash}</a>\n",
            escape_html(&href),
            escape_html(name)
        ));
    }
    html.push_str("</pre>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// A request path reduced to components that cannot leave the asset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPath {
    raw: String,
    segments: Vec<String>,
    wants_index: bool,
}

impl AssetPath {
    /// Percent-decode and normalise a request path. `..`, backslashes, NUL
    /// and invalid UTF-8 are all `NotFound`.
    pub fn parse(raw: &str) -> Result<Self> {
        let not_found = || AssetError::NotFound(raw.to_string());
        let decoded = percent_decode_str(raw)
            .decode_utf8()
            .map_err(|_| not_found())?;

        let mut segments = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(not_found()),
                s if s.contains('\\') || s.contains('\0') => return Err(not_found()),
                s => segments.push(s.to_string()),
            }
        }

        let wants_index = segments.is_empty() || decoded.ends_with('/');
        Ok(Self {
            raw: raw.to_string(),
            segments,
            wants_index,
        })
    }

    /// The path as it was requested.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Canonical URL of this path as a directory. Always starts with a
    /// single `/`.
    pub fn directory_location(&self) -> String {
        location(&self.segments)
    }

    /// `.../index.html` is addressed by its directory. Returns where to send
    /// such a request.
    pub fn index_redirect(&self) -> Option<String> {
        match self.segments.split_last() {
            Some((last, parent)) if !self.wants_index && last == INDEX_FILE => {
                Some(location(parent))
            }
            _ => None,
        }
    }

    /// `/`-joined key, with the index file appended for directory requests.
    fn key(&self) -> String {
        let mut key = self.segments.join("/");
        if self.wants_index {
            if !key.is_empty() {
                key.push('/');
            }
            key.push_str(INDEX_FILE);
        }
        key
    }

    /// Key of the directory itself, `""` for the root.
    fn dir_key(&self) -> String {
        self.segments.join("/")
    }

    fn listing_path(&self) -> String {
        let mut path = self.dir_key();
        path.push('/');
        path
    }

    fn dir_under(&self, root: &Path) -> PathBuf {
        let mut full = root.to_path_buf();
        full.extend(&self.segments);
        full
    }

    fn under(&self, root: &Path) -> PathBuf {
        let mut full = self.dir_under(root);
        if self.wants_index {
            full.push(INDEX_FILE);
        }
        full
    }

    fn not_found(&self) -> AssetError {
        AssetError::NotFound(self.raw.clone())
    }
}

fn location(segments: &[String]) -> String {
    let mut url = String::from("/");
    for segment in segments {
        url.extend(utf8_percent_encode(segment, PATH_SEGMENT));
        url.push('/');
    }
    url
}

/// Serves files from a directory on disk. Nothing is cached.
#[derive(Debug, Clone)]
pub struct FilesystemSource {
    root: PathBuf,
}

impl FilesystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn resolve(&self, path: &AssetPath) -> Result<Asset> {
        let full = path.under(&self.root);

        let metadata = match tokio::fs::metadata(&full).await {
            Ok(metadata) => metadata,
            Err(e) if is_missing(&e) && path.wants_index => return self.list(path).await,
            Err(e) if is_missing(&e) => return Err(path.not_found()),
            Err(source) => return Err(AssetError::Io { path: full, source }),
        };

        if metadata.is_dir() {
            if path.wants_index {
                return Err(path.not_found());
            }
            return Err(AssetError::IsDirectory(path.as_str().to_string()));
        }

        let data = tokio::fs::read(&full)
            .await
            .map_err(|source| AssetError::Io { path: full, source })?;

        Ok(Asset::new(path.key(), Bytes::from(data)))
    }

    async fn list(&self, path: &AssetPath) -> Result<Asset> {
        let dir = path.dir_under(&self.root);
        let io_error = |source: std::io::Error| AssetError::Io {
            path: dir.clone(),
            source,
        };

        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if is_missing(&e) => return Err(path.not_found()),
            Err(source) => return Err(io_error(source)),
        };

        let mut entries = BTreeMap::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(io_error)? {
            let is_dir = entry.file_type().await.map_err(io_error)?.is_dir();
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.insert(name, is_dir);
        }

        Ok(Asset::listing(path.listing_path(), &entries))
    }
}

fn is_missing(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

/// Serves the `static/` tree embedded at build time.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSource;

impl BundledSource {
    pub fn resolve(&self, path: &AssetPath) -> Result<Asset> {
        let key = path.key();

        if let Some(file) = EmbeddedStatic::get(&key) {
            let data = match file.data {
                Cow::Borrowed(bytes) => Bytes::from_static(bytes),
                Cow::Owned(bytes) => Bytes::from(bytes),
            };
            return Ok(Asset::new(key, data));
        }

        let entries = Self::children(&path.dir_key());
        if entries.is_empty() {
            return Err(path.not_found());
        }
        if path.wants_index {
            Ok(Asset::listing(path.listing_path(), &entries))
        } else {
            Err(AssetError::IsDirectory(path.as_str().to_string()))
        }
    }

    /// Immediate children of the embedded directory `dir` (`""` is the root).
    fn children(dir: &str) -> BTreeMap<String, bool> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        let mut entries = BTreeMap::new();
        for file in EmbeddedStatic::iter() {
            let Some(rest) = file.strip_prefix(prefix.as_str()) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => entries.insert(child.to_string(), true),
                None => entries.insert(rest.to_string(), false),
            };
        }
        entries
    }
}

/// The asset source selected at start-up.
#[derive(Debug, Clone)]
pub enum AssetSource {
    Filesystem(FilesystemSource),
    Bundled(BundledSource),
}

impl AssetSource {
    /// Build the source for `mode`. `root` is only read in filesystem mode.
    pub fn new(mode: AssetMode, root: impl Into<PathBuf>) -> Self {
        match mode {
            AssetMode::Filesystem => AssetSource::Filesystem(FilesystemSource::new(root)),
            AssetMode::Bundled => AssetSource::Bundled(BundledSource),
        }
    }

    pub fn mode(&self) -> AssetMode {
        match self {
            AssetSource::Filesystem(_) => AssetMode::Filesystem,
            AssetSource::Bundled(_) => AssetMode::Bundled,
        }
    }

    pub async fn resolve(&self, path: &AssetPath) -> Result<Asset> {
        match self {
            AssetSource::Filesystem(source) => source.resolve(path).await,
            AssetSource::Bundled(source) => source.resolve(path),
        }
    }
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSource::Filesystem(source) => {
                write!(f, "{} ({})", self.mode(), source.root.display())
            }
            AssetSource::Bundled(_) => write!(f, "{}", self.mode()),
        }
    }
}
