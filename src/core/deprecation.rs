//! Renamed flags and config keys
//!
//! Old names keep working for a while. Every use is recorded in a
//! [`Diagnostics`] collector which the command logs once it has finished
//! resolving its inputs.

/// A renamed parameter and the release that renamed it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deprecation {
    pub old: &'static str,
    pub new: &'static str,
    pub since: &'static str,
}

/// Profile keys in config.toml that were renamed
pub const PROFILE_KEYS: &[Deprecation] = &[
    Deprecation {
        old: "access_token",
        new: "token",
        since: "0.2.0",
    },
    Deprecation {
        old: "region_name",
        new: "region",
        since: "0.3.0",
    },
    Deprecation {
        old: "max_keys",
        new: "page_size",
        since: "0.3.0",
    },
];

/// `--limit` was the item ceiling before `--max-items`
pub const LIMIT_FLAG: Deprecation = Deprecation {
    old: "--limit",
    new: "--max-items",
    since: "0.3.0",
};

/// `--marker` was the resume token before `--starting-token`
pub const MARKER_FLAG: Deprecation = Deprecation {
    old: "--marker",
    new: "--starting-token",
    since: "0.2.0",
};

/// One recorded use of a deprecated name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Where the old name was used (a profile, or the command line)
    pub scope: String,
    pub deprecation: Deprecation,
}

impl Notice {
    pub fn message(&self) -> String {
        format!(
            "{}: '{}' is deprecated since {}, use '{}' instead",
            self.scope, self.deprecation.old, self.deprecation.since, self.deprecation.new
        )
    }
}

/// Collector for deprecation notices
#[derive(Debug, Default)]
pub struct Diagnostics {
    notices: Vec<Notice>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a use of a deprecated name
    pub fn deprecated(&mut self, scope: impl Into<String>, deprecation: &Deprecation) {
        self.notices.push(Notice {
            scope: scope.into(),
            deprecation: *deprecation,
        });
    }

    #[allow(dead_code)]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Log every recorded notice as a warning
    pub fn emit(&self) {
        for notice in &self.notices {
            log::warn!("{}", notice.message());
        }
    }
}

/// Rename deprecated keys of one profile table in place
///
/// When both the old and the new key are present the new one wins.
pub fn migrate_keys(table: &mut toml::Table, scope: &str, diagnostics: &mut Diagnostics) {
    for deprecation in PROFILE_KEYS {
        if let Some(value) = table.remove(deprecation.old) {
            diagnostics.deprecated(scope, deprecation);
            table.entry(deprecation.new).or_insert(value);
        }
    }
}

/// Pick the current flag's value, falling back to its deprecated spelling
pub fn prefer<T>(
    current: Option<T>,
    deprecated: Option<T>,
    deprecation: &Deprecation,
    diagnostics: &mut Diagnostics,
) -> Option<T> {
    if deprecated.is_some() {
        diagnostics.deprecated("command line", deprecation);
    }
    current.or(deprecated)
}
