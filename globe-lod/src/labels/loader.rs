use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use bevy::log::{info, warn};
use bevy::math::Vec3;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use globe_scene::Ellipsoid;

use super::{LabelEntry, MAX_FEATURE_LENGTH};
use crate::config::LabelsConfig;
use crate::error::{Error, Result};

pub const CURRENT_CACHE_VERSION: i8 = 1;

const FEATURE_RECORD_BYTES: usize = MAX_FEATURE_LENGTH + 1;
const HEADER_SENTINEL: &str = "Feature_Name";
const MIN_LINE_LENGTH: usize = 10;

#[derive(thiserror::Error, Debug)]
enum CacheError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("cache version {found} does not match {expected}")]
    VersionMismatch { found: i8, expected: i8 },
    #[error("cache file is truncated")]
    Truncated,
}

/// `<cache_dir>/<identifier>_<file name>.labelcache`, next to the labels file when
/// no cache directory is configured.
pub fn cache_path(config: &LabelsConfig, identifier: &str) -> PathBuf {
    let dir = match &config.cache_dir {
        Some(dir) => dir.clone(),
        None => config
            .file_name
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let file_name = config
        .file_name
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "labels".to_string());
    return dir.join(format!("{}_{}.labelcache", identifier, file_name));
}

/// Loads labels from the cache, re-parsing the source file when the cache is
/// missing or unusable. Only a failure to read the source file is returned.
pub fn load_labels(
    config: &LabelsConfig,
    identifier: &str,
    ellipsoid: &Ellipsoid,
) -> Result<Vec<LabelEntry>> {
    let cache_file = cache_path(config, identifier);
    if cache_file.exists() {
        info!(
            "Cached file '{}' used for labels file '{}'",
            cache_file.display(),
            config.file_name.display()
        );
        match read_cache_file(&cache_file) {
            Ok(labels) => return Ok(labels),
            Err(e) => {
                warn!("Discarding labels cache '{}': {}", cache_file.display(), e);
                if let Err(e) = std::fs::remove_file(&cache_file) {
                    warn!("Could not delete labels cache '{}': {}", cache_file.display(), e);
                }
            }
        }
    } else {
        info!("Cache for labels file '{}' not found", config.file_name.display());
    }

    info!("Loading labels file '{}'", config.file_name.display());
    let labels = read_labels_file(&config.file_name, ellipsoid)?;
    if labels.is_empty() {
        warn!("No labels in '{}', cache not written", config.file_name.display());
        return Ok(labels);
    }
    if let Err(e) = write_cache_file(&cache_file, &labels) {
        warn!("Could not write labels cache '{}': {}", cache_file.display(), e);
    }
    return Ok(labels);
}

pub fn read_labels_file(path: &Path, ellipsoid: &Ellipsoid) -> Result<Vec<LabelEntry>> {
    let file = File::open(path).map_err(|source| Error::LabelsFile {
        path: path.to_path_buf(),
        source,
    })?;
    return parse_labels(BufReader::new(file), ellipsoid).map_err(|source| Error::LabelsFile {
        path: path.to_path_buf(),
        source,
    });
}

/// Parses `name,target,diameter,latitude,longitude,coordinate system` lines.
pub fn parse_labels<R: BufRead>(reader: R, ellipsoid: &Ellipsoid) -> io::Result<Vec<LabelEntry>> {
    let mut labels = Vec::new();
    for (number, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        let line = line.trim_end_matches('\r');
        if line.len() <= MIN_LINE_LENGTH {
            continue;
        }
        let columns: Vec<&str> = line.split(',').collect();
        if clean_feature_name(columns[0]) == HEADER_SENTINEL {
            continue;
        }
        match parse_label_line(&columns, ellipsoid) {
            Some(label) => labels.push(label),
            None => warn!("Skipping malformed labels line {}", number + 1),
        }
    }
    return Ok(labels);
}

fn parse_label_line(columns: &[&str], ellipsoid: &Ellipsoid) -> Option<LabelEntry> {
    if columns.len() < 6 {
        return None;
    }
    let feature = clean_feature_name(columns[0]);
    // columns[1] is the target body
    let diameter = columns[2].trim().parse::<f32>().ok()?;
    let latitude = columns[3].trim().parse::<f32>().ok()?;
    let mut longitude = columns[4].trim().parse::<f32>().ok()?;
    if columns[5].contains("West") {
        longitude = 360.0 - longitude;
    }
    return Some(LabelEntry::new(feature, diameter, latitude, longitude, ellipsoid));
}

/// ASCII only, no quotes, no surrounding whitespace, at most 255 bytes.
fn clean_feature_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .flat_map(|c| {
            let replacement = if c.is_ascii() { c } else { '*' };
            std::iter::repeat(replacement).take(if c.is_ascii() { 1 } else { c.len_utf8() })
        })
        .filter(|c| *c != '"')
        .collect();
    name = name.trim().to_string();
    name.truncate(MAX_FEATURE_LENGTH);
    return name;
}

fn read_cache_file(path: &Path) -> std::result::Result<Vec<LabelEntry>, CacheError> {
    let file = File::open(path)?;
    return read_cache(&mut BufReader::new(file));
}

fn read_cache<R: Read>(reader: &mut R) -> std::result::Result<Vec<LabelEntry>, CacheError> {
    let version = reader.read_i8().map_err(truncated)?;
    if version != CURRENT_CACHE_VERSION {
        return Err(CacheError::VersionMismatch {
            found: version,
            expected: CURRENT_CACHE_VERSION,
        });
    }
    let count = reader.read_i32::<LittleEndian>().map_err(truncated)?;
    if count < 0 {
        return Err(CacheError::Truncated);
    }
    let mut labels = Vec::with_capacity((count as usize).min(1 << 16));
    let mut name = [0u8; FEATURE_RECORD_BYTES];
    for _ in 0..count {
        reader.read_exact(&mut name).map_err(truncated)?;
        let length = name.iter().position(|b| *b == 0).unwrap_or(MAX_FEATURE_LENGTH);
        let feature = String::from_utf8_lossy(&name[..length]).into_owned();
        let mut values = [0f32; 6];
        reader
            .read_f32_into::<LittleEndian>(&mut values)
            .map_err(truncated)?;
        labels.push(LabelEntry {
            feature,
            diameter: values[0],
            latitude: values[1],
            longitude: values[2],
            geo_position: Vec3::new(values[3], values[4], values[5]),
        });
    }
    return Ok(labels);
}

fn truncated(e: io::Error) -> CacheError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        return CacheError::Truncated;
    }
    return CacheError::Io(e);
}

fn write_cache_file(path: &Path, labels: &[LabelEntry]) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_cache(&mut writer, labels)?;
    return writer.flush();
}

pub fn write_cache<W: Write>(writer: &mut W, labels: &[LabelEntry]) -> io::Result<()> {
    let count = i32::try_from(labels.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many labels"))?;
    writer.write_i8(CURRENT_CACHE_VERSION)?;
    writer.write_i32::<LittleEndian>(count)?;
    for label in labels {
        let mut name = [0u8; FEATURE_RECORD_BYTES];
        let bytes = label.feature.as_bytes();
        let length = bytes.len().min(MAX_FEATURE_LENGTH);
        name[..length].copy_from_slice(&bytes[..length]);
        writer.write_all(&name)?;
        for value in [
            label.diameter,
            label.latitude,
            label.longitude,
            label.geo_position.x,
            label.geo_position.y,
            label.geo_position.z,
        ] {
            writer.write_f32::<LittleEndian>(value)?;
        }
    }
    return Ok(());
}
