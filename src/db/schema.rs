//! The static, declarative table/column specification the DDL layer consumes.
//!
//! One entry per column: type, nullability, uniqueness, primary-key flag,
//! unsigned flag, foreign-key reference and default value. Column order is part
//! of the spec and is preserved through table creation.

/// Size class for text columns. `Medium` widens to MEDIUMTEXT on mysql and
/// falls back to TEXT everywhere else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextSize {
    Medium,
}

#[derive(Clone, Copy, Debug)]
pub enum ColumnKind {
    /// Auto-incrementing integer id.
    Increments,
    Str { maxlength: u32 },
    Text { fieldtype: Option<TextSize> },
    Integer,
    Bool,
    DateTime,
}

#[derive(Clone, Copy, Debug)]
pub enum DefaultValue {
    Str(&'static str),
    Bool(bool),
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnSpec {
    pub kind: ColumnKind,
    pub nullable: bool,
    pub primary: bool,
    pub unique: bool,
    pub unsigned: bool,
    /// Foreign-key target as `"table.column"`, applied at table creation.
    pub references: Option<&'static str>,
    pub default_to: Option<DefaultValue>,
}

impl ColumnSpec {
    const fn new(kind: ColumnKind) -> Self {
        Self {
            kind,
            nullable: false,
            primary: false,
            unique: false,
            unsigned: false,
            references: None,
            default_to: None,
        }
    }

    pub const fn increments() -> Self {
        Self::new(ColumnKind::Increments).primary()
    }

    pub const fn string(maxlength: u32) -> Self {
        Self::new(ColumnKind::Str { maxlength })
    }

    pub const fn text() -> Self {
        Self::new(ColumnKind::Text { fieldtype: None })
    }

    pub const fn medium_text() -> Self {
        Self::new(ColumnKind::Text {
            fieldtype: Some(TextSize::Medium),
        })
    }

    pub const fn integer() -> Self {
        Self::new(ColumnKind::Integer)
    }

    pub const fn boolean() -> Self {
        Self::new(ColumnKind::Bool)
    }

    pub const fn date_time() -> Self {
        Self::new(ColumnKind::DateTime)
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    pub const fn references(mut self, target: &'static str) -> Self {
        self.references = Some(target);
        self
    }

    pub const fn default_str(mut self, value: &'static str) -> Self {
        self.default_to = Some(DefaultValue::Str(value));
        self
    }

    pub const fn default_bool(mut self, value: bool) -> Self {
        self.default_to = Some(DefaultValue::Bool(value));
        self
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [(&'static str, ColumnSpec)],
}

static POSTS: &[(&str, ColumnSpec)] = &[
    ("id", ColumnSpec::increments()),
    ("uuid", ColumnSpec::string(36)),
    ("title", ColumnSpec::string(150)),
    ("slug", ColumnSpec::string(150).unique()),
    ("markdown", ColumnSpec::medium_text().nullable()),
    ("html", ColumnSpec::medium_text().nullable()),
    ("image", ColumnSpec::text().nullable()),
    ("featured", ColumnSpec::boolean().nullable().default_bool(false)),
    ("page", ColumnSpec::boolean().nullable().default_bool(false)),
    ("status", ColumnSpec::string(150).default_str("draft")),
    ("language", ColumnSpec::string(6).default_str("en_US")),
    ("meta_title", ColumnSpec::string(150).nullable()),
    ("meta_description", ColumnSpec::string(200).nullable()),
    ("author_id", ColumnSpec::integer()),
    ("created_at", ColumnSpec::date_time()),
    ("created_by", ColumnSpec::integer()),
    ("updated_at", ColumnSpec::date_time().nullable()),
    ("updated_by", ColumnSpec::integer().nullable()),
    ("published_at", ColumnSpec::date_time().nullable()),
    ("published_by", ColumnSpec::integer().nullable()),
];

static USERS: &[(&str, ColumnSpec)] = &[
    ("id", ColumnSpec::increments()),
    ("uuid", ColumnSpec::string(36)),
    ("name", ColumnSpec::string(150)),
    ("slug", ColumnSpec::string(150).unique()),
    ("password", ColumnSpec::string(60)),
    ("email", ColumnSpec::string(254).unique()),
    ("image", ColumnSpec::text().nullable()),
    ("cover", ColumnSpec::text().nullable()),
    ("bio", ColumnSpec::string(200).nullable()),
    ("website", ColumnSpec::text().nullable()),
    ("location", ColumnSpec::text().nullable()),
    ("accessibility", ColumnSpec::text().nullable()),
    ("status", ColumnSpec::string(150).default_str("active")),
    ("language", ColumnSpec::string(6).default_str("en_US")),
    ("meta_title", ColumnSpec::string(150).nullable()),
    ("meta_description", ColumnSpec::string(200).nullable()),
    ("last_login", ColumnSpec::date_time().nullable()),
    ("created_at", ColumnSpec::date_time()),
    ("created_by", ColumnSpec::integer()),
    ("updated_at", ColumnSpec::date_time().nullable()),
    ("updated_by", ColumnSpec::integer().nullable()),
];

static ROLES: &[(&str, ColumnSpec)] = &[
    ("id", ColumnSpec::increments()),
    ("uuid", ColumnSpec::string(36)),
    ("name", ColumnSpec::string(150)),
    ("description", ColumnSpec::string(200).nullable()),
    ("created_at", ColumnSpec::date_time()),
    ("created_by", ColumnSpec::integer()),
    ("updated_at", ColumnSpec::date_time().nullable()),
    ("updated_by", ColumnSpec::integer().nullable()),
];

static ROLES_USERS: &[(&str, ColumnSpec)] = &[
    ("id", ColumnSpec::increments()),
    ("role_id", ColumnSpec::integer().references("roles.id")),
    ("user_id", ColumnSpec::integer().references("users.id")),
];

static PERMISSIONS: &[(&str, ColumnSpec)] = &[
    ("id", ColumnSpec::increments()),
    ("uuid", ColumnSpec::string(36)),
    ("name", ColumnSpec::string(150)),
    ("object_type", ColumnSpec::string(150)),
    ("action_type", ColumnSpec::string(150)),
    ("object_id", ColumnSpec::integer().nullable().unsigned()),
    ("created_at", ColumnSpec::date_time()),
    ("created_by", ColumnSpec::integer()),
    ("updated_at", ColumnSpec::date_time().nullable()),
    ("updated_by", ColumnSpec::integer().nullable()),
];

static PERMISSIONS_USERS: &[(&str, ColumnSpec)] = &[
    ("id", ColumnSpec::increments()),
    ("user_id", ColumnSpec::integer().references("users.id")),
    ("permission_id", ColumnSpec::integer().references("permissions.id")),
];

static PERMISSIONS_ROLES: &[(&str, ColumnSpec)] = &[
    ("id", ColumnSpec::increments()),
    ("role_id", ColumnSpec::integer().references("roles.id")),
    ("permission_id", ColumnSpec::integer().references("permissions.id")),
];

static SETTINGS: &[(&str, ColumnSpec)] = &[
    ("id", ColumnSpec::increments()),
    ("uuid", ColumnSpec::string(36)),
    ("key", ColumnSpec::string(150).unique()),
    ("value", ColumnSpec::text().nullable()),
    ("type", ColumnSpec::string(150).default_str("core")),
    ("created_at", ColumnSpec::date_time()),
    ("created_by", ColumnSpec::integer()),
    ("updated_at", ColumnSpec::date_time().nullable()),
    ("updated_by", ColumnSpec::integer().nullable()),
];

pub static TABLES: &[TableSpec] = &[
    TableSpec {
        name: "posts",
        columns: POSTS,
    },
    TableSpec {
        name: "users",
        columns: USERS,
    },
    TableSpec {
        name: "roles",
        columns: ROLES,
    },
    TableSpec {
        name: "roles_users",
        columns: ROLES_USERS,
    },
    TableSpec {
        name: "permissions",
        columns: PERMISSIONS,
    },
    TableSpec {
        name: "permissions_users",
        columns: PERMISSIONS_USERS,
    },
    TableSpec {
        name: "permissions_roles",
        columns: PERMISSIONS_ROLES,
    },
    TableSpec {
        name: "settings",
        columns: SETTINGS,
    },
];

pub fn tables() -> &'static [TableSpec] {
    TABLES
}

pub fn table(name: &str) -> Option<&'static TableSpec> {
    TABLES.iter().find(|t| t.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_has_a_primary_id() {
        for table in tables() {
            let (name, spec) = &table.columns[0];
            assert_eq!(*name, "id", "{} must lead with id", table.name);
            assert!(spec.primary, "{}.id must be primary", table.name);
            assert!(
                matches!(spec.kind, ColumnKind::Increments),
                "{}.id must auto-increment",
                table.name
            );
        }
    }

    #[test]
    fn references_point_at_spec_tables() {
        for t in tables() {
            for (column, spec) in t.columns {
                if let Some(target) = spec.references {
                    let (ref_table, ref_column) =
                        target.split_once('.').expect("reference must be table.column");
                    let target_spec =
                        table(ref_table).unwrap_or_else(|| panic!("{column} references {target}"));
                    assert!(
                        target_spec.columns.iter().any(|(c, _)| *c == ref_column),
                        "{target} does not exist"
                    );
                }
            }
        }
    }

    #[test]
    fn settings_key_is_unique_and_typed() {
        let settings = table("settings").unwrap();
        let key = settings
            .columns
            .iter()
            .find(|(name, _)| *name == "key")
            .map(|(_, spec)| spec)
            .unwrap();
        assert!(key.unique);
        assert!(!key.nullable);
        assert!(table("settings").unwrap().columns.iter().any(|(n, _)| *n == "type"));
    }
}
