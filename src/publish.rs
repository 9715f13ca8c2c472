//! Transfer of the staged output tree to the final destination.
//!
//! The copy is an explicit recursive merge: missing destination directories
//! are created, conflicting destination files are overwritten, and unrelated
//! pre-existing destination files are left untouched. The copy itself is not
//! atomic; a crash mid-publish can leave the destination with a mixture of
//! old and new files.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};

fn publish_io(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| Error::Publish {
        path: path.to_path_buf(),
        source,
    }
}

/// Recursively merge-copy `src` into `dest`.
///
/// `dest` names the directory that will mirror `src`; it is created if
/// missing. Symlinks are not followed into (the staged tree never contains
/// any).
pub fn merge_copy_tree(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(publish_io(dest))?;
    for entry in fs::read_dir(src).map_err(publish_io(src))? {
        let entry = entry.map_err(publish_io(src))?;
        let target = dest.join(entry.file_name());
        let file_type = entry.file_type().map_err(publish_io(&entry.path()))?;
        if file_type.is_dir() {
            merge_copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(publish_io(&target))?;
        }
    }
    Ok(())
}
