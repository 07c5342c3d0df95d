//! Opens one or more Parquet files, memory-maps them, and scans their column chunks
//! into [`PageInfo`] lists. Mirrors the shape of a connection pool: files are opened
//! lazily and at most once, and the file immediately after the one currently being
//! read is opened speculatively in the background.

use crate::error::{oos, Error, Result};
use crate::metadata::FileMetaData;
use crate::page::{MappedBuffer, PageInfo};
use crate::projection::Projection;
use crate::properties::ReaderProperties;
use crate::schema::{self, SchemaTree};
use crate::{scanner, thrift_bridge};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// A single opened file: its mapping and parsed footer.
pub struct OpenFile {
    pub path: PathBuf,
    pub mapping: MappedBuffer,
    pub metadata: FileMetaData,
}

fn open_file(path: &Path) -> Result<OpenFile> {
    let file = std::fs::File::open(path)?;
    // Safety: the mapping is read-only and this crate never truncates or otherwise
    // mutates a file it is concurrently reading; a mapping outliving the backing
    // file being resized by another process is the one hazard `memmap2` can't rule
    // out for us, which is why the API is `unsafe` in the first place.
    #[allow(unsafe_code)]
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    let mapping = MappedBuffer::new(mmap);
    let thrift_metadata = thrift_bridge::read_file_metadata(mapping.bytes())?;
    let metadata = FileMetaData::try_from_thrift(thrift_metadata)?;
    Ok(OpenFile {
        path: path.to_path_buf(),
        mapping,
        metadata,
    })
}

/// Every projected column's pages for one opened file, concatenated across all of
/// its row groups in file order.
pub struct OpenedFile {
    pub file: Arc<OpenFile>,
    pub columns: HashMap<String, Vec<PageInfo>>,
}

/// Coordinates opening and scanning the files a multi-file read spans.
pub struct FileManager {
    properties: ReaderProperties,
    projection: Projection,
    paths: Vec<PathBuf>,
    opened: Mutex<HashMap<usize, Arc<OnceCell<Arc<OpenFile>>>>>,
    reference_schema: Mutex<Option<SchemaTree>>,
}

impl FileManager {
    pub fn new(paths: Vec<PathBuf>, properties: ReaderProperties, projection: Projection) -> Self {
        FileManager {
            properties,
            projection,
            paths,
            opened: Mutex::new(HashMap::new()),
            reference_schema: Mutex::new(None),
        }
    }

    pub fn properties(&self) -> ReaderProperties {
        self.properties
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn cell_for(&self, index: usize) -> Arc<OnceCell<Arc<OpenFile>>> {
        let mut guard = self.opened.lock().unwrap();
        guard.entry(index).or_insert_with(|| Arc::new(OnceCell::new())).clone()
    }

    /// Opens (or returns the already-opened) file at `index`, checking its schema
    /// against the first file opened in this read for compatibility.
    pub async fn open(&self, index: usize) -> Result<Arc<OpenFile>> {
        let path = self
            .paths
            .get(index)
            .ok_or_else(|| oos!("file index {} is out of range", index))?
            .clone();
        let cell = self.cell_for(index);
        let file = cell
            .get_or_try_init(|| async move {
                log::debug!("opening parquet file {}", path.display());
                let opened = tokio::task::spawn_blocking(move || open_file(&path))
                    .await
                    .map_err(|e| {
                        log::error!("file-open task panicked: {e}");
                        Error::MalformedFile(format!("file-open task panicked: {e}"))
                    })??;
                Ok::<Arc<OpenFile>, Error>(Arc::new(opened))
            })
            .await?
            .clone();

        let mut reference = self.reference_schema.lock().unwrap();
        match reference.as_ref() {
            None => *reference = Some(file.metadata.schema.clone()),
            Some(existing) => {
                if let Err(err) = schema::check_compatible(existing, &file.metadata.schema, &self.projection) {
                    log::warn!("schema mismatch opening {}: {err}", file.path.display());
                    return Err(err);
                }
            }
        }
        Ok(file)
    }

    /// Idempotently kicks off opening the file at `index` in the background. A
    /// no-op if that file is already opened or being opened, or if `index` is past
    /// the end of the file list.
    pub fn prefetch_next(self: &Arc<Self>, index: usize) {
        if index >= self.paths.len() {
            return;
        }
        {
            let guard = self.opened.lock().unwrap();
            if guard.contains_key(&index) {
                return;
            }
        }
        let manager = self.clone();
        tokio::spawn(async move {
            if let Err(err) = manager.open(index).await {
                log::warn!("background prefetch of file {index} failed: {err}");
            }
        });
    }

    /// Opens file `index`, scans every projected column's row groups into page
    /// lists, and triggers prefetching file `index + 1`.
    pub async fn open_projected(self: &Arc<Self>, index: usize, projection: &Projection) -> Result<OpenedFile> {
        let file = self.open(index).await?;
        self.prefetch_next(index + 1);
        projection.validate(&file.metadata.schema)?;

        let mut columns: HashMap<String, Vec<PageInfo>> = HashMap::new();
        for leaf in &file.metadata.schema.leaves {
            let path = leaf.path_in_schema.join(".");
            if !projection.includes(&path) {
                continue;
            }
            let mut pages = Vec::new();
            for row_group in &file.metadata.row_groups {
                let chunk = row_group
                    .column(&path)
                    .ok_or_else(|| oos!("row group is missing column '{}'", path))?;
                let scanned = scanner::scan_column_chunk(&file.mapping, chunk)?;
                pages.extend(scanned.pages);
            }
            columns.insert(path, pages);
        }
        Ok(OpenedFile { file, columns })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manager_has_no_files() {
        let manager = FileManager::new(vec![], ReaderProperties::default(), Projection::All);
        assert!(manager.is_empty());
    }
}
