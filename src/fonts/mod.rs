//! Font loading for the PDF renderer.
//!
//! `genpdf` embeds TrueType fonts, so a font family must be found on disk
//! before a PDF can be produced. Directories are searched in this order:
//!
//! 1. the directory passed to [`load_font_family`],
//! 2. `GRID_REPORT_FONTS_DIR`,
//! 3. `assets/fonts` next to the running executable,
//! 4. `assets/fonts` inside this crate.
//!
//! Each of these must contain the bundled Roboto family. When none does, the
//! system families in [`SYSTEM_FAMILIES`] are tried.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

/// Environment variable overriding the bundled font directory.
pub const FONTS_DIR_ENV: &str = "GRID_REPORT_FONTS_DIR";

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

const STYLE_SUFFIXES: [&str; 4] = ["Regular", "Bold", "Italic", "BoldItalic"];

/// A font family installed with the operating system.
pub struct SystemFamily {
    pub name: &'static str,
    pub directories: &'static [&'static str],
    /// Regular, bold, italic and bold italic file names.
    pub files: [&'static str; 4],
}

/// System families tried when no bundled fonts are available.
pub const SYSTEM_FAMILIES: &[SystemFamily] = &[
    SystemFamily {
        name: "Liberation Sans",
        directories: &[
            "/usr/share/fonts/truetype/liberation",
            "/usr/share/fonts/truetype/liberation2",
            "/usr/share/fonts/liberation-sans",
            "/usr/share/fonts/liberation",
            "/usr/share/fonts/TTF",
        ],
        files: [
            "LiberationSans-Regular.ttf",
            "LiberationSans-Bold.ttf",
            "LiberationSans-Italic.ttf",
            "LiberationSans-BoldItalic.ttf",
        ],
    },
    SystemFamily {
        name: "Arial",
        directories: &["C:\\Windows\\Fonts", "/Library/Fonts", "/System/Library/Fonts/Supplemental"],
        files: ["arial.ttf", "arialbd.ttf", "ariali.ttf", "arialbi.ttf"],
    },
];

fn bundled_file_names() -> Vec<String> {
    STYLE_SUFFIXES
        .iter()
        .map(|suffix| format!("{DEFAULT_FONT_FAMILY_NAME}-{suffix}.ttf"))
        .collect()
}

fn font_directory_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    let mut push = |candidate: PathBuf| {
        if !candidates.iter().any(|existing| existing == &candidate) {
            candidates.push(candidate);
        }
    };

    if let Some(path) = explicit {
        push(path.to_path_buf());
    }

    if let Some(path) = env::var_os(FONTS_DIR_ENV).filter(|value| !value.is_empty()) {
        push(PathBuf::from(path));
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            push(bin_dir.join("assets/fonts"));
        }
    }

    push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"));
    candidates
}

fn missing_files(directory: &Path, files: &[impl AsRef<str>]) -> Vec<String> {
    files
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| !directory.join(name).is_file())
        .map(str::to_string)
        .collect()
}

fn resolve_bundled_directory(explicit: Option<&Path>) -> Result<PathBuf, Vec<String>> {
    let files = bundled_file_names();
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates(explicit) {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        let missing = missing_files(&candidate, &files);
        if missing.is_empty() {
            return Ok(candidate);
        }
        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }

    Err(attempts)
}

fn load_font(path: &Path) -> Result<FontData, Error> {
    FontData::load(path, None).map_err(|err| {
        Error::new(
            format!("Failed to load font {}: {}", path.display(), err),
            io::Error::new(io::ErrorKind::InvalidData, err.to_string()),
        )
    })
}

fn load_family_from(directory: &Path, files: &[impl AsRef<str>]) -> Result<FontFamily<FontData>, Error> {
    let path = |index: usize| directory.join(files[index].as_ref());
    Ok(FontFamily {
        regular: load_font(&path(0))?,
        bold: load_font(&path(1))?,
        italic: load_font(&path(2))?,
        bold_italic: load_font(&path(3))?,
    })
}

fn system_family_directory(family: &SystemFamily) -> Option<PathBuf> {
    family
        .directories
        .iter()
        .map(PathBuf::from)
        .find(|directory| missing_files(directory, &family.files).is_empty())
}

/// Loads the font family used for PDF output.
pub fn load_font_family(explicit: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    let attempts = match resolve_bundled_directory(explicit) {
        Ok(directory) => {
            debug!("loading {} fonts from {}", DEFAULT_FONT_FAMILY_NAME, directory.display());
            return load_family_from(&directory, &bundled_file_names());
        }
        Err(attempts) => attempts,
    };

    for family in SYSTEM_FAMILIES {
        if let Some(directory) = system_family_directory(family) {
            warn!(
                "Bundled fonts unavailable ({}); falling back to system '{}' family in {}.",
                attempts.join(", "),
                family.name,
                directory.display()
            );
            return load_family_from(&directory, &family.files);
        }
    }

    Err(Error::new(
        format!(
            "Unable to locate a font family. Checked: {}. Set {} to a directory holding the {} fonts.",
            attempts.join(", "),
            FONTS_DIR_ENV,
            DEFAULT_FONT_FAMILY_NAME
        ),
        io::Error::new(io::ErrorKind::NotFound, "no usable font family found"),
    ))
}

/// Whether [`load_font_family`] would find a family without an explicit
/// directory.
pub fn fonts_available() -> bool {
    resolve_bundled_directory(None).is_ok()
        || SYSTEM_FAMILIES
            .iter()
            .any(|family| system_family_directory(family).is_some())
}

/// Whether an error means that no fonts could be found, as opposed to fonts
/// that were found but failed to load.
pub fn is_missing_fonts(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err) if io_err.kind() == io::ErrorKind::NotFound
    )
}
