//! Connector segments.
//!
//! A [`ConnectorSegment`] names an internal sub-resource of a connector,
//! for a relational platform the database or schema name. Segment identity
//! is its code; tags render into the URL path as `code:tag1:tag2` while the
//! remaining attributes travel in `code.`-namespaced query keys.

use std::collections::{BTreeMap, BTreeSet};

use crate::credentials::{ConnectorCredentials, CredentialsBuilder};
use crate::error::ConnectionError;
use crate::profile::Profile;

/// A named internal sub-resource of a connector.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectorSegment {
    /// Segment code; the identity in paths and query-key namespaces.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Profiles this segment participates in.
    pub profiles: BTreeSet<Profile>,
    /// Tags attached to the segment.
    pub tags: BTreeSet<String>,
    /// Segment-level credentials; empty means the descriptor-level
    /// credentials apply.
    pub credentials: ConnectorCredentials,
    /// Free-form options.
    pub options: BTreeMap<String, String>,
}

impl ConnectorSegment {
    /// Renders the path form: `code[:tag1:tag2]`, tags sorted.
    #[must_use]
    pub fn to_uri_path_part(&self) -> String {
        if self.tags.is_empty() {
            self.code.clone()
        } else {
            let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
            format!("{}:{}", self.code, tags.join(":"))
        }
    }

    /// Adds this segment's query entries (`code.name`, `code.profiles`,
    /// `code.tags`, `code.credentials`, `code.options`) to a query map,
    /// skipping empty attributes.
    pub fn fill_uri_query_map(&self, query: &mut BTreeMap<String, String>) {
        if !self.name.trim().is_empty() {
            query.insert(format!("{}.name", self.code), self.name.clone());
        }
        if !self.profiles.is_empty() {
            let codes: Vec<&str> = self.profiles.iter().map(|p| p.code.as_str()).collect();
            query.insert(format!("{}.profiles", self.code), codes.join(","));
        }
        if !self.tags.is_empty() {
            let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
            query.insert(format!("{}.tags", self.code), tags.join(","));
        }
        if self.credentials != ConnectorCredentials::default() {
            query.insert(
                format!("{}.credentials", self.code),
                self.credentials.to_uri_query_part(),
            );
        }
        if !self.options.is_empty() {
            query.insert(
                format!("{}.options", self.code),
                serde_json::to_string(&self.options).unwrap_or_default(),
            );
        }
    }
}

/// Mutable assembly state for [`ConnectorSegment`]; local to construction.
#[derive(Debug, Clone, Default)]
pub struct SegmentBuilder {
    /// Segment code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Profiles.
    pub profiles: BTreeSet<Profile>,
    /// Tags.
    pub tags: BTreeSet<String>,
    /// Credentials under assembly.
    pub credentials: CredentialsBuilder,
    /// Free-form options.
    pub options: BTreeMap<String, String>,
}

impl SegmentBuilder {
    /// Freezes the builder into an immutable value.
    #[must_use]
    pub fn build(&self) -> ConnectorSegment {
        ConnectorSegment {
            code: self.code.clone(),
            name: self.name.clone(),
            profiles: self.profiles.clone(),
            tags: self.tags.clone(),
            credentials: self.credentials.build(),
            options: self.options.clone(),
        }
    }

    /// Populates the builder from a path part (`code[:tag…]`) plus the
    /// URL's query map (`code.profiles`, `code.credential`, `code.name`,
    /// `code.options`, `code.tags`).
    ///
    /// # Errors
    ///
    /// Propagates user-info and JSON decode failures.
    pub fn setup_from_uri(
        &mut self,
        part: &str,
        query: &BTreeMap<String, String>,
    ) -> Result<(), ConnectionError> {
        let mut pieces = part.split(':');
        self.code = pieces.next().unwrap_or("").to_string();
        self.tags.extend(pieces.map(str::to_string));

        if let Some(value) = query.get(&format!("{}.profiles", self.code)) {
            self.profiles.extend(
                value
                    .split(',')
                    .filter(|s| !s.trim().is_empty())
                    .map(Profile::get),
            );
        }
        if let Some(value) = query.get(&format!("{}.credential", self.code)) {
            self.credentials.setup_from_user_info(value)?;
        }
        if let Some(value) = query.get(&format!("{}.name", self.code)) {
            self.name = value.clone();
        }
        if let Some(value) = query.get(&format!("{}.options", self.code)) {
            let map: BTreeMap<String, String> = serde_json::from_str(value)?;
            self.options.extend(map);
        }
        if let Some(value) = query.get(&format!("{}.tags", self.code)) {
            self.tags
                .extend(value.split(',').filter(|s| !s.trim().is_empty()).map(str::to_string));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_part_plain() {
        let segment = ConnectorSegment {
            code: "db".into(),
            ..ConnectorSegment::default()
        };
        assert_eq!(segment.to_uri_path_part(), "db");
    }

    #[test]
    fn test_path_part_with_tags_sorted() {
        let segment = ConnectorSegment {
            code: "db".into(),
            tags: ["z".to_string(), "a".to_string()].into(),
            ..ConnectorSegment::default()
        };
        assert_eq!(segment.to_uri_path_part(), "db:a:z");
    }

    #[test]
    fn test_setup_from_uri_path_tags() {
        let mut builder = SegmentBuilder::default();
        builder.setup_from_uri("db:main:ro", &BTreeMap::new()).unwrap();
        let segment = builder.build();
        assert_eq!(segment.code, "db");
        assert_eq!(segment.tags, ["main".to_string(), "ro".to_string()].into());
    }

    #[test]
    fn test_setup_from_uri_query_attributes() {
        let mut query = BTreeMap::new();
        query.insert("db.name".to_string(), "Main DB".to_string());
        query.insert("db.profiles".to_string(), "dev,prod".to_string());
        query.insert("db.tags".to_string(), "x,y".to_string());
        query.insert("db.credential".to_string(), "u,p".to_string());
        query.insert("db.options".to_string(), r#"{"a":"1"}"#.to_string());

        let mut builder = SegmentBuilder::default();
        builder.setup_from_uri("db", &query).unwrap();
        let segment = builder.build();

        assert_eq!(segment.name, "Main DB");
        assert_eq!(segment.profiles, [Profile::get("dev"), Profile::get("prod")].into());
        assert_eq!(segment.tags, ["x".to_string(), "y".to_string()].into());
        assert_eq!(segment.credentials.user, "u");
        assert_eq!(segment.credentials.password, "p");
        assert_eq!(segment.options.get("a"), Some(&"1".to_string()));
    }

    #[test]
    fn test_setup_ignores_other_segments_keys() {
        let mut query = BTreeMap::new();
        query.insert("other.name".to_string(), "nope".to_string());

        let mut builder = SegmentBuilder::default();
        builder.setup_from_uri("db", &query).unwrap();
        assert!(builder.build().name.is_empty());
    }

    #[test]
    fn test_fill_query_map_round_trips_credentials() {
        let mut query = BTreeMap::new();
        query.insert("db.credential".to_string(), "u,p".to_string());
        let mut builder = SegmentBuilder::default();
        builder.setup_from_uri("db", &query).unwrap();
        let segment = builder.build();

        let mut out = BTreeMap::new();
        segment.fill_uri_query_map(&mut out);
        // Written under the plural key, query-part form.
        assert_eq!(out.get("db.credentials"), Some(&"u,p".to_string()));
    }

    #[test]
    fn test_fill_query_map_skips_empty() {
        let segment = ConnectorSegment {
            code: "db".into(),
            ..ConnectorSegment::default()
        };
        let mut out = BTreeMap::new();
        segment.fill_uri_query_map(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_malformed_options_json_fails() {
        let mut query = BTreeMap::new();
        query.insert("db.options".to_string(), "{bad".to_string());
        let mut builder = SegmentBuilder::default();
        assert!(builder.setup_from_uri("db", &query).is_err());
    }
}
