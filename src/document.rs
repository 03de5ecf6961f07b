//! Photo-book project files: traversal, load/save and backup.
//!
//! Pages, layers and elements are kept as the order-preserving JSON records
//! they were read from. Geometry is parsed only from picture elements on
//! non-cover pages, and an alignment writes back nothing but
//! `position.x`/`position.y` and `size.width`/`size.height` before dropping
//! `cropping`. Every other record, key and number is saved as it was read.
//!
//! # Example
//!
//! ```
//! use bookalign::GridConfig;
//! use bookalign::document::Project;
//!
//! let json = r#"{
//!     "pages": [
//!         {"size": {"width": 210, "height": 297}, "layers": []},
//!         {"size": {"width": 210, "height": 297}, "layers": [{"elements": [{
//!             "id": "p1",
//!             "type": "PICTURE",
//!             "position": {"x": 105, "y": 100},
//!             "size": {"width": 80, "height": 60},
//!             "picture": {"dimension": {"width": 800, "height": 600}},
//!             "cropping": {"x": 0.1}
//!         }]}]}
//!     ]
//! }"#;
//!
//! let mut project = Project::from_json(json).unwrap();
//! let report = project.align(&GridConfig::DEFAULT).unwrap();
//! assert_eq!(report.pictures.len(), 1);
//!
//! let element = project.element(1, 0, 0).unwrap();
//! assert!(!element.has_cropping());
//! assert!((element.size().unwrap().height - 40.0).abs() < 1e-9);
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::align::{Alignment, align_picture};
use crate::geometry::{Point, Rect, Size};
use crate::grid::GridConfig;

/// Type tag of the elements the engine repositions.
pub const PICTURE: &str = "PICTURE";

/// Separator between the file stem and the timestamp of a backup copy.
const BACKUP_SEPARATOR: &str = "___";

/// Indentation of saved project files.
const INDENT: &[u8] = b"    ";

/// A JSON object as read from the project file, keys in file order.
pub type Record = Map<String, Value>;

/// Errors from reading, aligning or writing a project.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("cannot find project file {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid project file", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize project")]
    Serialize(#[source] serde_json::Error),

    #[error("serialized project is not valid UTF-8")]
    Encoding(#[source] std::string::FromUtf8Error),

    #[error("project has no `pages` list")]
    MissingPages,

    #[error("page {page}: missing `{field}`")]
    MissingPageField { page: usize, field: &'static str },

    #[error("{element}: missing `{field}`")]
    MissingField {
        element: ElementRef,
        field: &'static str,
    },
}

/// Where an element sits in the project, for messages and reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementRef {
    pub page: usize,
    pub layer: usize,
    pub index: usize,
    /// The element's `id`, when it has one.
    pub id: Option<String>,
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {}, layer {}, element {}",
            self.page, self.layer, self.index
        )?;
        if let Some(id) = &self.id {
            write!(f, " ({id})")?;
        }
        Ok(())
    }
}

/// A photo-book project: an ordered list of pages, the first being the cover.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Project {
    root: Record,
}

/// Read-only view of one element record.
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    fields: &'a Record,
}

impl<'a> Element<'a> {
    pub fn new(fields: &'a Record) -> Self {
        Self { fields }
    }

    pub fn is_picture(&self) -> bool {
        self.fields.get("type").and_then(Value::as_str) == Some(PICTURE)
    }

    /// The element's `id` rendered as text.
    pub fn id(&self) -> Option<String> {
        match self.fields.get("id")? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Whether the element carries a crop record.
    pub fn has_cropping(&self) -> bool {
        self.fields.contains_key("cropping")
    }

    /// Center of the element, when `position` holds numeric `x` and `y`.
    pub fn position(&self) -> Option<Point> {
        read_point(self.fields.get("position"))
    }

    pub fn size(&self) -> Option<Size> {
        read_size(self.fields.get("size"))
    }

    /// Pixel dimensions of the placed image.
    pub fn source_dimension(&self) -> Option<Size> {
        read_size(self.fields.get("picture")?.get("dimension"))
    }

    /// The untouched record.
    pub fn record(&self) -> &'a Record {
        self.fields
    }
}

fn number(record: &Record, key: &str) -> Option<f64> {
    record.get(key)?.as_f64()
}

fn read_point(value: Option<&Value>) -> Option<Point> {
    let record = value?.as_object()?;
    Some(Point::new(number(record, "x")?, number(record, "y")?))
}

fn read_size(value: Option<&Value>) -> Option<Size> {
    let record = value?.as_object()?;
    Some(Size::new(
        number(record, "width")?,
        number(record, "height")?,
    ))
}

/// Overwrite two numeric keys of the object stored under `key`, in place.
fn write_pair(record: &mut Record, key: &str, first: (&str, f64), second: (&str, f64)) {
    if let Some(Value::Object(inner)) = record.get_mut(key) {
        inner.insert(first.0.to_owned(), Value::from(first.1));
        inner.insert(second.0.to_owned(), Value::from(second.1));
    }
}

/// One aligned picture and where it was.
#[derive(Clone, Debug, PartialEq)]
pub struct PictureAlignment {
    pub element: ElementRef,
    /// Frame before alignment.
    pub before: Rect,
    pub alignment: Alignment,
}

/// Summary of one alignment pass over a project.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlignReport {
    /// Number of pages visited (the cover excluded).
    pub pages: usize,
    /// Elements left untouched because they are not pictures.
    pub skipped: usize,
    pub pictures: Vec<PictureAlignment>,
}

impl AlignReport {
    /// Alignments that happened on page `page`.
    pub fn on_page(&self, page: usize) -> impl Iterator<Item = &PictureAlignment> {
        self.pictures.iter().filter(move |p| p.element.page == page)
    }
}

/// Align one picture element in place and drop its crop record.
///
/// Fails without touching the element when any field the engine needs is
/// absent or not numeric. Keys other than the four coordinates keep their
/// values and positions.
pub fn align_element(
    element: &mut Record,
    page_size: Size,
    config: &GridConfig,
    at: &ElementRef,
) -> Result<PictureAlignment, DocumentError> {
    let missing = |field| DocumentError::MissingField {
        element: at.clone(),
        field,
    };
    let view = Element::new(element);
    let position = view.position().ok_or_else(|| missing("position"))?;
    let size = view.size().ok_or_else(|| missing("size"))?;
    if !element.contains_key("picture") {
        return Err(missing("picture"));
    }
    let source = view
        .source_dimension()
        .ok_or_else(|| missing("picture.dimension"))?;

    let alignment = align_picture(position, size, source, page_size, config);
    write_pair(
        element,
        "position",
        ("x", alignment.position.x),
        ("y", alignment.position.y),
    );
    write_pair(
        element,
        "size",
        ("width", alignment.size.width),
        ("height", alignment.size.height),
    );
    element.shift_remove("cropping");

    Ok(PictureAlignment {
        element: at.clone(),
        before: Rect::from_center(position, size),
        alignment,
    })
}

impl Project {
    /// Parse a project from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and parse a project file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DocumentError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| DocumentError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The top-level record.
    pub fn record(&self) -> &Record {
        &self.root
    }

    fn pages(&self) -> &[Value] {
        self.root
            .get("pages")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of pages, the cover included.
    pub fn page_count(&self) -> usize {
        self.pages().len()
    }

    /// Size of page `page`, when it has a numeric one.
    pub fn page_size(&self, page: usize) -> Option<Size> {
        read_size(self.pages().get(page)?.get("size"))
    }

    /// Element `index` of layer `layer` on page `page`.
    pub fn element(&self, page: usize, layer: usize, index: usize) -> Option<Element<'_>> {
        let fields = self
            .pages()
            .get(page)?
            .get("layers")?
            .get(layer)?
            .get("elements")?
            .get(index)?
            .as_object()?;
        Some(Element::new(fields))
    }

    /// Serialize with four-space indentation.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(INDENT);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser).map_err(DocumentError::Serialize)?;
        String::from_utf8(buf).map_err(DocumentError::Encoding)
    }

    /// Write the project to `path`, replacing its contents.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "saved project");
        Ok(())
    }

    /// Align every picture on every page but the cover.
    ///
    /// A page's `size` is only required once a picture is found on it.
    /// Stops at the first picture that lacks a required field. Pictures
    /// aligned before that point stay aligned.
    pub fn align(&mut self, config: &GridConfig) -> Result<AlignReport, DocumentError> {
        let mut report = AlignReport::default();
        let pages = self
            .root
            .get_mut("pages")
            .and_then(Value::as_array_mut)
            .ok_or(DocumentError::MissingPages)?;

        for (page_index, page) in pages.iter_mut().enumerate().skip(1) {
            let missing = |field| DocumentError::MissingPageField {
                page: page_index,
                field,
            };
            let page = page.as_object_mut().ok_or_else(|| missing("layers"))?;
            let page_size = read_size(page.get("size"));
            let layers = page
                .get_mut("layers")
                .and_then(Value::as_array_mut)
                .ok_or_else(|| missing("layers"))?;
            tracing::info!(page = page_index, size = ?page_size, "aligning page");
            report.pages += 1;

            for (layer_index, layer) in layers.iter_mut().enumerate() {
                let elements = layer
                    .get_mut("elements")
                    .and_then(Value::as_array_mut)
                    .ok_or_else(|| missing("layers[].elements"))?;
                for (index, element) in elements.iter_mut().enumerate() {
                    let record = element.as_object_mut();
                    let at = ElementRef {
                        page: page_index,
                        layer: layer_index,
                        index,
                        id: record.as_deref().and_then(|r| Element::new(r).id()),
                    };
                    let Some(record) = record.filter(|r| r.contains_key("type")) else {
                        return Err(DocumentError::MissingField {
                            element: at,
                            field: "type",
                        });
                    };
                    if !Element::new(record).is_picture() {
                        report.skipped += 1;
                        continue;
                    }
                    let page_size = page_size.ok_or_else(|| missing("size"))?;
                    let aligned = align_element(record, page_size, config, &at)?;
                    tracing::info!(
                        element = %at,
                        axis = ?aligned.alignment.axis,
                        placement = ?aligned.alignment.placement,
                        "laid out picture"
                    );
                    report.pictures.push(aligned);
                }
            }
        }

        Ok(report)
    }
}

/// Path of the backup copy of `path` taken at `now`.
///
/// `book.json` becomes `book___1700000000.123456.json` in the same directory.
pub fn backup_path(path: &Path, now: DateTime<Utc>) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let name = format!(
        "{stem}{BACKUP_SEPARATOR}{}.{:06}{suffix}",
        now.timestamp(),
        now.timestamp_subsec_micros()
    );
    path.with_file_name(name)
}

/// Copy `path` to a timestamped sibling and return the copy's path.
pub fn backup(path: &Path) -> Result<PathBuf, DocumentError> {
    let target = backup_path(path, Utc::now());
    fs::copy(path, &target).map_err(|source| DocumentError::Io {
        path: target.clone(),
        source,
    })?;
    tracing::info!(backup = %target.display(), "backed up project file");
    Ok(target)
}
