//! Parsers for the delimited dataset files.
//!
//! Three files make up a dataset:
//! - ratings: `user \t item_id \t rating \t timestamp`
//! - items:   `item_id|title|...|flag|flag|...` (genre flags from a fixed column on)
//! - genres:  `genre_name|column_index`
//!
//! All files are ISO-8859-1 encoded.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Helper function to read a file with ISO-8859-1 encoding (Latin-1)
///
/// Each Latin-1 byte maps directly to the Unicode code point of the same value.
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content: String = bytes.iter().map(|&b| b as char).collect();

    Ok(content.lines().map(|s| s.to_string()).collect())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Pull the next field off a split line or report which one was missing
fn next_field<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    file: &str,
    line: usize,
    name: &str,
) -> Result<&'a str> {
    parts.next().ok_or_else(|| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Missing {name}"),
    })
}

/// Parse the genre file
///
/// Format: `genre|index`. Blank genre names are skipped; columns are
/// numbered in file order.
pub fn parse_genres(path: &Path) -> Result<GenreIndex> {
    let lines = read_lines_latin1(path)?;
    let names: Vec<String> = lines
        .iter()
        .filter_map(|line| {
            let genre = line.split('|').next().unwrap_or("").trim();
            (!genre.is_empty()).then(|| genre.to_string())
        })
        .collect();
    Ok(GenreIndex::new(names))
}

/// Parse the item file into the catalog and the feature matrix
///
/// Format: `id|title|...`, genre flags start at field `feature_offset`.
///
/// Titles that occur more than once get their id appended (`"Title [id]"`)
/// so the catalog stays a bijection.
pub fn parse_items(path: &Path, feature_offset: usize) -> Result<(ItemCatalog, FeatureMatrix)> {
    let file = file_label(path);
    let lines = read_lines_latin1(path)?;
    let mut catalog = ItemCatalog::new();
    let mut rows = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line_trimmed.split('|').collect();
        let mut parts = fields.iter().copied();
        let id_str = next_field(&mut parts, &file, line_no, "itemId")?;
        let title = next_field(&mut parts, &file, line_no, "title")?.trim();

        let id: ItemId = id_str.trim().parse().map_err(|e| DataLoadError::ParseError {
            file: file.clone(),
            line: line_no,
            reason: format!("Invalid itemId: {}", e),
        })?;

        let title = if catalog.id_of(title).is_some() {
            let renamed = format!("{title} [{id}]");
            warn!(
                "Duplicate title {:?} at item {}, registering it as {:?}",
                title, id, renamed
            );
            renamed
        } else {
            title.to_string()
        };
        catalog.insert(id, title)?;

        if fields.len() < feature_offset {
            return Err(DataLoadError::FieldCountMismatch {
                expected: feature_offset,
                found: fields.len(),
                line: line_no,
            });
        }
        let row = fields[feature_offset..]
            .iter()
            .map(|flag| {
                flag.trim().parse::<u8>().map_err(|e| DataLoadError::ParseError {
                    file: file.clone(),
                    line: line_no,
                    reason: format!("Invalid genre flag {:?}: {}", flag, e),
                })
            })
            .collect::<Result<Vec<u8>>>()?;
        rows.push(row);
    }

    Ok((catalog, FeatureMatrix::new(rows)?))
}

/// Parse the ratings file
///
/// Format: `user \t itemId \t rating [\t timestamp]`. Item ids are resolved
/// to titles through the catalog.
pub fn parse_ratings(path: &Path, catalog: &ItemCatalog) -> Result<RatingMatrix> {
    let file = file_label(path);
    let lines = read_lines_latin1(path)?;
    let mut ratings = RatingMatrix::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }
        let mut parts = line_trimmed.split('\t');

        let user = next_field(&mut parts, &file, line_no, "userId")?.trim();
        let item_id = next_field(&mut parts, &file, line_no, "itemId")?.trim();
        let rating_value = next_field(&mut parts, &file, line_no, "rating")?.trim();

        let item_id: ItemId = item_id.parse().map_err(|e| DataLoadError::ParseError {
            file: file.clone(),
            line: line_no,
            reason: format!("Invalid itemId: {}", e),
        })?;
        let rating: f64 = rating_value.parse().map_err(|e| DataLoadError::ParseError {
            file: file.clone(),
            line: line_no,
            reason: format!("Invalid rating: {}", e),
        })?;
        let title = catalog
            .title(item_id)
            .ok_or_else(|| DataLoadError::MissingReference {
                entity: "Item".to_string(),
                key: item_id.to_string(),
            })?;

        ratings.insert(user, title, rating);
    }
    Ok(ratings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_genres_skips_blank_lines() {
        let file = write_temp("unknown|0\nAction|1\n\nComedy|2\n");
        let genres = parse_genres(file.path()).unwrap();
        assert_eq!(genres.len(), 3);
        assert_eq!(genres.name(1), Some("Action"));
    }

    #[test]
    fn test_parse_items() {
        let file = write_temp(
            "1|Toy Story (1995)|01-Jan-1995||http://x|0|1|1\n\
             2|GoldenEye (1995)|01-Jan-1995||http://y|1|0|0\n",
        );
        let (catalog, features) = parse_items(file.path(), 5).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.title(1), Some("Toy Story (1995)"));
        assert_eq!(catalog.id_of("GoldenEye (1995)"), Some(2));
        assert_eq!(features.width(), 3);
        assert_eq!(features.row(0), Some(&[0u8, 1, 1][..]));
    }

    #[test]
    fn test_parse_items_disambiguates_duplicate_titles() {
        let file = write_temp("1|Chasing Amy (1997)|||u|1\n2|Chasing Amy (1997)|||u|1\n");
        let (catalog, _) = parse_items(file.path(), 5).unwrap();
        assert_eq!(catalog.title(2), Some("Chasing Amy (1997) [2]"));
    }

    #[test]
    fn test_parse_ratings_resolves_titles() {
        let catalog = ItemCatalog::from_titles(["A", "B"]).unwrap();
        let file = write_temp("196\t2\t3\t881250949\n186\t1\t4.5\t891717742\n");
        let ratings = parse_ratings(file.path(), &catalog).unwrap();
        assert_eq!(ratings.get("196", "B"), Some(3.0));
        assert_eq!(ratings.get("186", "A"), Some(4.5));
        assert_eq!(ratings.rating_count(), 2);
    }

    #[test]
    fn test_parse_ratings_unknown_item() {
        let catalog = ItemCatalog::from_titles(["A"]).unwrap();
        let file = write_temp("1\t7\t3\t0\n");
        let result = parse_ratings(file.path(), &catalog);
        assert!(matches!(result, Err(DataLoadError::MissingReference { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = parse_genres(Path::new("/definitely/not/here.genre"));
        assert!(matches!(result, Err(DataLoadError::FileNotFound { .. })));
    }
}
