//! Reading and writing manifest files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::output;
use crate::core::manifest::Manifest;
use crate::error::{Error, Result};

/// Read and parse a manifest file.
pub fn load(path: &Path) -> Result<Manifest> {
    let text = fs::read_to_string(path).map_err(|e| Error::from(e).in_file(path))?;
    let manifest = Manifest::parse(&text).map_err(|e| e.in_file(path))?;
    debug!(path = %path.display(), documents = manifest.len(), "loaded manifest");
    Ok(manifest)
}

/// Render a manifest to `dest`, or to stdout when there is none.
pub fn emit(manifest: &Manifest, dest: Option<&Path>) -> Result<()> {
    let text = manifest.render()?;
    match dest {
        Some(path) => {
            write_atomic(path, &text).map_err(|e| e.in_file(path))?;
            output::success(&format!("wrote {}", output::path(path.display())));
            Ok(())
        }
        None => Ok(output::data(&text)?),
    }
}

/// Replace `path` with `contents` via a sibling temp file and rename.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = temp_path(path);
    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        if let Ok(meta) = fs::metadata(path) {
            fs::set_permissions(&tmp, meta.permissions())?;
        }
        fs::rename(&tmp, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.kubecrypt-tmp-{}", name, std::process::id()))
}
