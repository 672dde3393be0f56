use std::path::Path;

/// Write an SVG document, creating missing parent directories.
pub fn save_svg(svg: &str, path: &Path) -> crate::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, svg)?;
    Ok(())
}
