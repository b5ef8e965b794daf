use anyhow::anyhow;
use formatx::formatx;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

pub trait Output: Debug {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each location key to its own file in a directory. The file template takes the
/// location key and then the file extension, e.g. `"scenario__{}.{}"`.
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }

    fn file_path(&self, location_key: &str, file_extension: &str) -> anyhow::Result<PathBuf> {
        let file_name = formatx!(&self.file_template, location_key, file_extension)
            .map_err(|err| anyhow!("invalid output file template: {err:?}"))?;
        Ok(self.directory_path.join(file_name))
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(BufWriter::new(File::create(
            self.file_path(location_key, file_extension)?,
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }
}

/// Keeps every written "file" in memory, keyed by `<location key>.<extension>` in the order the
/// files were first written. Clones share the same contents.
#[derive(Clone, Debug, Default)]
pub struct MemoryOutput(Arc<Mutex<IndexMap<String, Vec<u8>>>>);

impl MemoryOutput {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.lock().keys().cloned().collect()
    }

    /// The bytes written under the given file name, if any.
    pub fn contents(&self, file_name: &str) -> Option<Vec<u8>> {
        self.0.lock().get(file_name).cloned()
    }

    pub fn contents_as_string(&self, file_name: &str) -> Option<String> {
        self.contents(file_name)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Output for MemoryOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(MemoryFileWriter::new(
            self.0.clone(),
            format!("{location_key}.{file_extension}"),
        ))
    }
}

impl Output for &MemoryOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <MemoryOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }
}

/// Represents a writer for an individual in-memory "file".
struct MemoryFileWriter {
    files: Arc<Mutex<IndexMap<String, Vec<u8>>>>,
    file_name: String,
}

impl MemoryFileWriter {
    /// Creating the writer truncates any earlier file of the same name, as creating a file would.
    fn new(files: Arc<Mutex<IndexMap<String, Vec<u8>>>>, file_name: String) -> Self {
        files.lock().insert(file_name.clone(), vec![]);
        Self { files, file_name }
    }
}

impl Write for MemoryFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.files
            .lock()
            .entry(self.file_name.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}
