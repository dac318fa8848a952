//! # Path Notations
//!
//! A single datum is addressed three ways across the converter:
//!
//! | notation        | example                               |
//! |-----------------|---------------------------------------|
//! | data dictionary | `/ENTRY[entry]/DATA[data]/@signal`    |
//! | schema (NXDL)   | `/ENTRY/DATA/@signal`                 |
//! | storage (HDF5)  | `/entry/data/@signal`                 |
//!
//! A data-dictionary segment is either a plain name (`title`) or a schema
//! token followed by a bracketed suggested name (`ENTRY[entry]`). Schema
//! notation keeps the token, storage notation keeps the suggested name.
//!
//! Segment-level helpers are total over any string. Path-level helpers
//! reject input that does not follow the `/seg/seg` grammar with
//! [`PathError`].

use crate::error::PathError;

/// Strip the bracketed suggested name from a segment.
///
/// `ENTRY[entry]` becomes `ENTRY`; a segment without brackets is returned
/// unchanged.
pub fn entry_to_schema_segment(segment: &str) -> &str {
    match segment.find('[') {
        Some(open) => &segment[..open],
        None => segment,
    }
}

/// Return the bracketed suggested name of a segment.
///
/// `ENTRY[entry]` yields `entry`. A segment without a complete bracket pair
/// is its own suggested name, so `title` yields `title`.
pub fn extract_suggested_name(segment: &str) -> &str {
    if let Some(open) = segment.find('[') {
        let rest = &segment[open + 1..];
        if let Some(close) = rest.find(']') {
            return &rest[..close];
        }
    }
    segment
}

/// Check a data-dictionary path against the `/seg/seg` grammar.
///
/// # Errors
///
/// Returns [`PathError`] for an empty path, a path not starting with `/`,
/// a trailing `/`, an empty interior segment, or unbalanced brackets.
pub fn check_path(path: &str) -> Result<(), PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    if !path.starts_with('/') {
        return Err(PathError::NotAbsolute(path.to_string()));
    }
    if path.ends_with('/') {
        return Err(PathError::TrailingSlash(path.to_string()));
    }
    for segment in path[1..].split('/') {
        if segment.is_empty() {
            return Err(PathError::EmptySegment(path.to_string()));
        }
        if !brackets_balanced(segment) {
            return Err(PathError::UnbalancedBrackets {
                path: path.to_string(),
                segment: segment.to_string(),
            });
        }
    }
    Ok(())
}

fn brackets_balanced(segment: &str) -> bool {
    let opens = segment.matches('[').count();
    let closes = segment.matches(']').count();
    if opens != closes {
        return false;
    }
    match (segment.find('['), segment.find(']')) {
        (Some(open), Some(close)) => open < close,
        (None, None) => true,
        _ => false,
    }
}

fn map_segments(path: &str, f: impl Fn(&str) -> &str) -> Result<String, PathError> {
    check_path(path)?;
    let mut out = String::with_capacity(path.len());
    for segment in path[1..].split('/') {
        out.push('/');
        out.push_str(f(segment));
    }
    Ok(out)
}

/// Convert a data-dictionary path to schema notation.
///
/// `/ENTRY[entry]/sample` becomes `/ENTRY/sample`.
pub fn template_path_to_schema_path(path: &str) -> Result<String, PathError> {
    map_segments(path, entry_to_schema_segment)
}

/// Convert a data-dictionary path to the on-disk storage path.
///
/// `/ENTRY[entry]/sample` becomes `/entry/sample`.
pub fn template_path_to_storage_path(path: &str) -> Result<String, PathError> {
    map_segments(path, extract_suggested_name)
}

/// The path with its last segment removed, or `None` when only the root
/// would remain.
///
/// Works on any notation: `/ENTRY[entry]/sample` yields `/ENTRY[entry]`,
/// and `/ENTRY[entry]` yields `None`.
pub fn parent_path(path: &str) -> Option<&str> {
    match path.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => Some(parent),
        _ => None,
    }
}

/// The last `/`-separated segment of a path.
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether the path addresses an attribute, i.e. the suggested name of its
/// last segment starts with `@`.
pub fn is_attribute_path(path: &str) -> bool {
    extract_suggested_name(last_segment(path)).starts_with('@')
}

/// Whether `candidate` is `ancestor` itself or lies below it.
///
/// Both paths must use the same notation.
pub fn is_same_or_descendant(candidate: &str, ancestor: &str) -> bool {
    match candidate.strip_prefix(ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Convert a NeXus class to its schema token: `NXentry` becomes `ENTRY`.
pub fn convert_nexus_to_caps(nexus_name: &str) -> String {
    nexus_name.get(2..).unwrap_or_default().to_uppercase()
}

/// Suggest an instance name for a group from its NeXus class:
/// `NXentry` becomes `entry`.
pub fn convert_nexus_to_suggested_name(nexus_name: &str) -> &str {
    nexus_name.get(2..).unwrap_or_default()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z_]{1,8}",
            ("[A-Z]{1,8}", "[a-z_0-9]{1,8}").prop_map(|(t, n)| format!("{t}[{n}]")),
            "@[a-z_]{1,8}",
        ]
    }

    fn data_path() -> impl Strategy<Value = String> {
        prop::collection::vec(segment(), 1..6).prop_map(|segs| format!("/{}", segs.join("/")))
    }

    proptest! {
        /// Both conversions are pure functions of the input path.
        #[test]
        fn conversions_are_deterministic(path in data_path()) {
            prop_assert_eq!(
                template_path_to_schema_path(&path).unwrap(),
                template_path_to_schema_path(&path).unwrap()
            );
            prop_assert_eq!(
                template_path_to_storage_path(&path).unwrap(),
                template_path_to_storage_path(&path).unwrap()
            );
        }

        /// Conversions keep the segment count and never introduce brackets.
        #[test]
        fn conversions_preserve_depth(path in data_path()) {
            let depth = path.matches('/').count();
            let schema = template_path_to_schema_path(&path).unwrap();
            let storage = template_path_to_storage_path(&path).unwrap();
            prop_assert_eq!(schema.matches('/').count(), depth);
            prop_assert_eq!(storage.matches('/').count(), depth);
            prop_assert!(!schema.contains('['));
            prop_assert!(!storage.contains(']'));
        }

        /// Schema notation is a fixed point of the schema conversion.
        #[test]
        fn schema_conversion_is_idempotent(path in data_path()) {
            let once = template_path_to_schema_path(&path).unwrap();
            let twice = template_path_to_schema_path(&once).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
