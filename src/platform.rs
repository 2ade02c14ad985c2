//! Platform registry.
//!
//! [`Platform`] enumerates the supported connector platform kinds; the data
//! for each one (schemes, ports, family flags) lives in the static
//! [`PLATFORMS`] table. Adding a platform is a new table row, not a new type.

use std::fmt;

/// A connector platform kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    /// PostgreSQL relational database.
    PostgreSql,
    /// Apache Cassandra.
    Cassandra,
    /// Elasticsearch.
    Elastic,
    /// Elassandra (Cassandra with an embedded Elasticsearch).
    Elassandra,
    /// S3-compatible object storage.
    S3,
    /// HDFS.
    Hdfs,
    /// Plain HTTP/REST endpoint.
    Rest,
    /// RabbitMQ message broker.
    RabbitMq,
    /// Platform is not (yet) known; matches anything.
    #[default]
    Undefined,
}

/// Static registry record for one platform.
///
/// The family flags are informational only; matching and codec logic never
/// branch on them.
#[derive(Debug, Clone, Copy)]
pub struct PlatformSpec {
    /// The platform this record describes.
    pub platform: Platform,
    /// Upper-case tag used in `.type` query keys and canonical output.
    pub tag: &'static str,
    /// SQL database family.
    pub is_sql: bool,
    /// Cassandra family.
    pub is_cassandra: bool,
    /// Search/Elastic family.
    pub is_elastic: bool,
    /// Binary/blob storage family.
    pub is_binary: bool,
    /// REST family.
    pub is_rest: bool,
    /// Message queue family.
    pub is_queue: bool,
    /// Scheme used when rendering a plain connection URL.
    pub out_scheme: &'static str,
    /// Scheme used when rendering a secure connection URL.
    pub out_secure_scheme: &'static str,
    /// Scheme spellings accepted on input.
    pub in_schemes: &'static [&'static str],
    /// Default plain port.
    pub port: u16,
    /// Default secure port.
    pub secure_port: u16,
}

/// The platform registry table.
///
/// Scheme spellings are unique across the table except where intentionally
/// shared (`jdbc-postgres` vs the `jdbc` shorthand). The irregular values
/// (`jdbc-postgress`, secure port 433) are carried as compatibility data.
pub const PLATFORMS: &[PlatformSpec] = &[
    PlatformSpec {
        platform: Platform::PostgreSql,
        tag: "POSTGRESQL",
        is_sql: true,
        is_cassandra: false,
        is_elastic: false,
        is_binary: false,
        is_rest: false,
        is_queue: false,
        out_scheme: "jdbc-postgres",
        out_secure_scheme: "jdbc-postgress",
        in_schemes: &["jdbc-postgres", "postgres", "jdbc"],
        port: 5432,
        secure_port: 5432,
    },
    PlatformSpec {
        platform: Platform::Cassandra,
        tag: "CASSANDRA",
        is_sql: false,
        is_cassandra: true,
        is_elastic: false,
        is_binary: false,
        is_rest: false,
        is_queue: false,
        out_scheme: "cassandra",
        out_secure_scheme: "cassandras",
        in_schemes: &["cassandra", "cassandras"],
        port: 9042,
        secure_port: 9042,
    },
    PlatformSpec {
        platform: Platform::Elastic,
        tag: "ELASTIC",
        is_sql: false,
        is_cassandra: false,
        is_elastic: true,
        is_binary: false,
        is_rest: true,
        is_queue: false,
        out_scheme: "elastic",
        out_secure_scheme: "elastics",
        in_schemes: &["elastic", "elastics"],
        port: 9200,
        secure_port: 9200,
    },
    PlatformSpec {
        platform: Platform::Elassandra,
        tag: "ELASSANDRA",
        is_sql: false,
        is_cassandra: true,
        is_elastic: true,
        is_binary: false,
        is_rest: false,
        is_queue: false,
        out_scheme: "elassandra",
        out_secure_scheme: "elassandras",
        in_schemes: &["elassandra", "elassandras"],
        port: 9042,
        secure_port: 9042,
    },
    PlatformSpec {
        platform: Platform::S3,
        tag: "S3",
        is_sql: false,
        is_cassandra: false,
        is_elastic: false,
        is_binary: true,
        is_rest: false,
        is_queue: false,
        out_scheme: "http",
        out_secure_scheme: "https",
        in_schemes: &["s3", "s3s"],
        port: 9000,
        secure_port: 9000,
    },
    PlatformSpec {
        platform: Platform::Hdfs,
        tag: "HDFS",
        is_sql: false,
        is_cassandra: false,
        is_elastic: false,
        is_binary: true,
        is_rest: false,
        is_queue: false,
        out_scheme: "hdfs",
        out_secure_scheme: "hdfss",
        in_schemes: &["hdfs", "hdfss"],
        port: 9020,
        secure_port: 9020,
    },
    PlatformSpec {
        platform: Platform::Rest,
        tag: "REST",
        is_sql: false,
        is_cassandra: false,
        is_elastic: false,
        is_binary: false,
        is_rest: true,
        is_queue: false,
        out_scheme: "http",
        out_secure_scheme: "https",
        in_schemes: &["http", "https"],
        port: 80,
        secure_port: 433,
    },
    PlatformSpec {
        platform: Platform::RabbitMq,
        tag: "RABBITMQ",
        is_sql: false,
        is_cassandra: false,
        is_elastic: false,
        is_binary: false,
        is_rest: false,
        is_queue: true,
        out_scheme: "rabbit",
        out_secure_scheme: "rabbits",
        in_schemes: &["rabbit", "rabbits", "rabbitmq", "rabbitmqs"],
        port: 5672,
        secure_port: 5672,
    },
    PlatformSpec {
        platform: Platform::Undefined,
        tag: "UNDEFINED",
        is_sql: false,
        is_cassandra: false,
        is_elastic: false,
        is_binary: false,
        is_rest: false,
        is_queue: false,
        out_scheme: "undefined",
        out_secure_scheme: "undefineds",
        in_schemes: &[],
        port: 80,
        secure_port: 433,
    },
];

impl Platform {
    /// Every platform in registry order.
    pub const ALL: [Platform; 9] = [
        Platform::PostgreSql,
        Platform::Cassandra,
        Platform::Elastic,
        Platform::Elassandra,
        Platform::S3,
        Platform::Hdfs,
        Platform::Rest,
        Platform::RabbitMq,
        Platform::Undefined,
    ];

    /// Returns the registry record for this platform.
    #[must_use]
    pub fn spec(self) -> &'static PlatformSpec {
        PLATFORMS
            .iter()
            .find(|s| s.platform == self)
            .unwrap_or(&PLATFORMS[PLATFORMS.len() - 1])
    }

    /// Looks a platform up by its tag, case-insensitively.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Platform> {
        PLATFORMS
            .iter()
            .find(|s| s.tag.eq_ignore_ascii_case(code))
            .map(|s| s.platform)
    }

    /// Looks a platform up by an inbound scheme spelling.
    #[must_use]
    pub fn from_scheme(scheme: &str) -> Option<Platform> {
        PLATFORMS
            .iter()
            .find(|s| s.in_schemes.contains(&scheme))
            .map(|s| s.platform)
    }

    /// Platform compatibility check.
    ///
    /// Reflexive; [`Platform::Undefined`] matches anything; `ELASTIC` and
    /// `CASSANDRA` additionally match the composite `ELASSANDRA`. Not a
    /// general transitivity rule: the composite case is a named special
    /// case.
    #[must_use]
    pub fn matches(self, other: Platform) -> bool {
        if self == other {
            return true;
        }
        if self == Platform::Undefined {
            return true;
        }
        if self == Platform::Elastic || self == Platform::Cassandra {
            return other == Platform::Elassandra;
        }
        false
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().tag)
    }
}
