#![allow(dead_code)]

use std::path::Path;

use walkdir::WalkDir;

#[path = "../../src/fixture.rs"]
mod fixture;

pub use fixture::{zlib, Attr, ContainerBuilder, Node};

/// Every file below `root`, relative to it and sorted
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect::<Vec<_>>();
    files.sort();
    files
}
