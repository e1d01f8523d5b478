use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::emit::GoFile;
use crate::{Error, Result};

/// Where rendered files go.
pub trait Sink {
    fn write(&mut self, file: &GoFile) -> Result<()>;
}

/// Writes `<TypeName>.go` into a directory, then runs the formatter on it.
///
/// Formatter problems are logged and otherwise ignored; the unformatted file stays on disk.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    formatter: Vec<String>,
    created_dir: bool,
    written: Vec<PathBuf>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>, formatter: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            formatter,
            created_dir: false,
            written: vec![],
        }
    }

    /// Paths written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn format(&self, path: &Path) {
        let Some((program, args)) = self.formatter.split_first() else {
            return;
        };
        match Command::new(program).args(args).arg(path).status() {
            Ok(status) if status.success() => {
                tracing::debug!(path = %path.display(), formatter = %program, "Formatted");
            }
            Ok(status) => {
                tracing::warn!(path = %path.display(), formatter = %program, %status, "Formatter failed, leaving file unformatted");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), formatter = %program, error = %e, "Could not run formatter, leaving file unformatted");
            }
        }
    }
}

impl Sink for FileSink {
    fn write(&mut self, file: &GoFile) -> Result<()> {
        if !self.created_dir {
            fs::create_dir_all(&self.dir).map_err(|source| Error::Write {
                path: self.dir.clone(),
                source,
            })?;
            self.created_dir = true;
        }
        let path = self.dir.join(file.file_name());
        fs::write(&path, &file.source).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Wrote");
        self.format(&path);
        self.written.push(path);
        Ok(())
    }
}

/// Streams every file to a writer, each preceded by a `// <file name>` line.
pub struct WriterSink<W> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn write(&mut self, file: &GoFile) -> Result<()> {
        let name = file.file_name();
        writeln!(self.out, "// {name}")
            .and_then(|_| writeln!(self.out, "{}", file.source))
            .map_err(|source| Error::Write {
                path: PathBuf::from(name),
                source,
            })
    }
}
