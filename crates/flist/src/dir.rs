//! The directory loader (§4.E) and the paired src/dst view the driver walks.

use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use metadata::{MetadataError, PlatformFs};
use ordered_map::OrderedMap;

use crate::node::{LoadOptions, Node};

/// A directory's children, keyed by child name and held in lexicographic
/// order. Mirrors `pc.c`'s `DIRNODE`.
#[derive(Debug, Clone)]
pub struct DirNode {
    /// Path this directory was loaded from.
    pub path: PathBuf,
    /// Immediate children, keyed by file name.
    pub nodes: OrderedMap<Node>,
}

/// The source and destination directory views the replication driver
/// compares and reconciles. Mirrors `pc.c`'s `DIRPAIR`.
#[derive(Debug, Clone)]
pub struct DirPair {
    /// Source-side children.
    pub src: DirNode,
    /// Destination-side children.
    pub dst: DirNode,
}

fn has_trailing_separator(path: &Path) -> bool {
    path.as_os_str().as_bytes().ends_with(b"/")
}

/// Loads `path` into a [`DirNode`].
///
/// If `contents_mode` is set, or `path` carries one or more trailing path
/// separators, `path` is opened as a directory and one [`Node`] is inserted
/// per immediate child (`.`/`..` are never yielded by `read_dir`, so no
/// explicit exclusion is needed). Otherwise a single [`Node`] is inserted,
/// keyed by `path`'s final component — the shape used when a leaf path is
/// being replicated onto a directory.
///
/// A non-existent `path` yields an empty [`DirNode`] rather than an error,
/// so the comparator naturally reports "all new". Permission errors
/// propagate.
pub fn load_directory(
    path: &Path,
    contents_mode: bool,
    options: LoadOptions,
    fs: &dyn PlatformFs,
) -> Result<DirNode, MetadataError> {
    let as_directory = contents_mode || has_trailing_separator(path);

    if as_directory {
        load_directory_contents(path, options, fs)
    } else {
        load_single_entry(path, options, fs)
    }
}

fn load_directory_contents(
    path: &Path,
    options: LoadOptions,
    fs: &dyn PlatformFs,
) -> Result<DirNode, MetadataError> {
    let mut nodes = OrderedMap::new();

    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(DirNode {
                path: path.to_path_buf(),
                nodes,
            });
        }
        Err(err) => return Err(MetadataError::from_io("read_dir", err)),
    };

    for entry in entries {
        let entry = entry.map_err(|err| MetadataError::from_io("read_dir", err))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let child_path = entry.path();
        let node = Node::load(child_path, options, fs)?;
        nodes.upsert(name, node);
    }

    Ok(DirNode {
        path: path.to_path_buf(),
        nodes,
    })
}

fn load_single_entry(
    path: &Path,
    options: LoadOptions,
    fs: &dyn PlatformFs,
) -> Result<DirNode, MetadataError> {
    let mut nodes = OrderedMap::new();

    match Node::load(path.to_path_buf(), options, fs) {
        Ok(node) => {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            nodes.upsert(name, node);
        }
        Err(err) if err.kind() == metadata::MetadataErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    Ok(DirNode {
        path: path.to_path_buf(),
        nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use metadata::UnixFs;
    use test_support::{scratch_dir, write_file};

    #[test]
    fn contents_mode_lists_immediate_children_sorted() {
        let dir = scratch_dir();
        write_file(&dir.path().join("b.txt"), b"b");
        write_file(&dir.path().join("a.txt"), b"a");

        let loaded =
            load_directory(dir.path(), true, LoadOptions::default(), &UnixFs).expect("load dir");
        let names: Vec<&str> = loaded.nodes.keys().collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn trailing_separator_implies_contents_mode() {
        let dir = scratch_dir();
        write_file(&dir.path().join("a.txt"), b"a");
        let mut with_slash = dir.path().as_os_str().to_owned();
        with_slash.push("/");

        let loaded = load_directory(
            Path::new(&with_slash),
            false,
            LoadOptions::default(),
            &UnixFs,
        )
        .expect("load dir");
        assert_eq!(loaded.nodes.len(), 1);
        assert!(loaded.nodes.contains("a.txt"));
    }

    #[test]
    fn leaf_mode_inserts_single_node_keyed_by_final_component() {
        let dir = scratch_dir();
        let file = dir.path().join("a.txt");
        write_file(&file, b"a");

        let loaded = load_directory(&file, false, LoadOptions::default(), &UnixFs).expect("load");
        assert_eq!(loaded.nodes.len(), 1);
        assert!(loaded.nodes.contains("a.txt"));
    }

    #[test]
    fn missing_source_yields_empty_directory_not_an_error() {
        let dir = scratch_dir();
        let missing = dir.path().join("does-not-exist");

        let loaded =
            load_directory(&missing, true, LoadOptions::default(), &UnixFs).expect("load dir");
        assert!(loaded.nodes.is_empty());
    }
}
