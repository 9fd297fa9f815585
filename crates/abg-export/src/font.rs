use abg_core::error::{CoreError, Result};
use std::path::{Path, PathBuf};

/// Familles essayées quand celle demandée est introuvable.
pub const FALLBACK_FAMILIES: &[&str] = &[
    "DejaVuSansMono",
    "LiberationMono-Regular",
    "NotoSansMono-Regular",
    "Menlo",
    "consola",
    "cour",
];

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// Sub-directory depth explored under each font root.
const MAX_DEPTH: u32 = 3;

/// System and user font roots, most specific first.
#[must_use]
pub fn font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join(".fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    for dir in [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/System/Library/Fonts",
        "/Library/Fonts",
        "C:\\Windows\\Fonts",
    ] {
        dirs.push(PathBuf::from(dir));
    }
    dirs
}

/// Look for `<family>.ttf` / `<family>.otf` below `dirs`.
///
/// The file stem is compared case-insensitively.
#[must_use]
pub fn find_font_in(family: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let wanted = family.to_ascii_lowercase();
    dirs.iter().find_map(|dir| search_dir(dir, &wanted, MAX_DEPTH))
}

fn search_dir(dir: &Path, wanted: &str, depth: u32) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
            continue;
        }
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| FONT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        let stem_ok = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.to_ascii_lowercase() == wanted);
        if ext_ok && stem_ok {
            return Some(path);
        }
    }
    if depth == 0 {
        return None;
    }
    subdirs.sort();
    subdirs.into_iter().find_map(|sub| search_dir(&sub, wanted, depth - 1))
}

/// Charge les octets d'une police.
///
/// `family` may be a path to a font file. Otherwise it is looked up by file
/// name in the system font directories, then [`FALLBACK_FAMILIES`] are tried.
///
/// # Errors
/// Returns [`CoreError::Render`] if no usable font is found or it can't be read.
pub fn load_font(family: &str) -> Result<Vec<u8>> {
    load_font_from(family, &font_dirs())
}

/// [`load_font`] with explicit search roots.
///
/// # Errors
/// Returns [`CoreError::Render`] if no usable font is found or it can't be read.
pub fn load_font_from(family: &str, dirs: &[PathBuf]) -> Result<Vec<u8>> {
    let explicit = Path::new(family);
    let path = if explicit.is_file() {
        Some(explicit.to_path_buf())
    } else {
        find_font_in(family, dirs).or_else(|| {
            let fallback = FALLBACK_FAMILIES
                .iter()
                .filter(|f| !f.eq_ignore_ascii_case(family))
                .find_map(|f| find_font_in(f, dirs));
            if let Some(p) = &fallback {
                log::warn!("Police '{family}' introuvable, repli sur {}", p.display());
            }
            fallback
        })
    };

    let path = path.ok_or_else(|| {
        CoreError::Render(format!(
            "police '{family}' introuvable (ni repli {FALLBACK_FAMILIES:?}) ; passez un chemin avec --font-family"
        ))
    })?;
    log::info!("Police : {}", path.display());
    std::fs::read(&path).map_err(|e| CoreError::Render(format!("lecture de {} : {e}", path.display())))
}
