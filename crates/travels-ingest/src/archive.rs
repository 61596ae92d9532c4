//! Archive readers producing named member blobs.
//!
//! A dataset ships either as a zip file or as a directory holding the
//! unpacked members. Both yield [`ArchiveMember`]s in a stable order: zip
//! central-directory order, or file name order for a directory.

use std::{
  fs::{self, File},
  io::{BufReader, Read, Seek},
  path::Path,
};

use bytes::Bytes;
use zip::ZipArchive;

use crate::{Error, Result};

/// Upper bound on the buffer reserved from a member's declared size. The
/// header is not trusted beyond this; larger members grow as they are read.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// One named blob of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
  pub name: String,
  pub data: Bytes,
}

impl ArchiveMember {
  pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
    Self {
      name: name.into(),
      data: data.into(),
    }
  }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
  move |source| Error::Io {
    path: path.to_path_buf(),
    source,
  }
}

/// Read every member of the archive at `path`: a directory of files, or a
/// zip file otherwise.
pub fn read_archive(path: &Path) -> Result<Vec<ArchiveMember>> {
  let meta = fs::metadata(path).map_err(io_error(path))?;
  if meta.is_dir() {
    return read_dir(path);
  }
  let file = File::open(path).map_err(io_error(path))?;
  read_zip(BufReader::new(file))
}

/// Read every file entry of a zip archive. Directory entries are skipped.
pub fn read_zip<R: Read + Seek>(reader: R) -> Result<Vec<ArchiveMember>> {
  let mut archive = ZipArchive::new(reader)?;
  let mut members = Vec::with_capacity(archive.len());

  for i in 0..archive.len() {
    let mut file = archive.by_index(i)?;
    if file.is_dir() {
      continue;
    }
    let name = file.name().to_owned();
    let declared = file.size().min(MAX_PREALLOCATION);
    let mut data = Vec::with_capacity(usize::try_from(declared).unwrap_or(0));
    if let Err(source) = file.read_to_end(&mut data) {
      return Err(Error::Member { member: name, source });
    }
    members.push(ArchiveMember::new(name, data));
  }

  Ok(members)
}

/// Read every regular file directly inside `dir`, sorted by file name.
pub fn read_dir(dir: &Path) -> Result<Vec<ArchiveMember>> {
  let mut paths = Vec::new();
  for entry in fs::read_dir(dir).map_err(io_error(dir))? {
    let entry = entry.map_err(io_error(dir))?;
    let path = entry.path();
    if entry.file_type().map_err(io_error(&path))?.is_file() {
      paths.push(path);
    }
  }
  paths.sort();

  paths
    .iter()
    .map(|path| {
      let data = fs::read(path).map_err(io_error(path))?;
      let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
      Ok(ArchiveMember::new(name, data))
    })
    .collect()
}
