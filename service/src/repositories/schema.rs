//! SQL text for the database provider
//!
//! Built once from [`SchemaConfig`] when a realm is constructed. Names are
//! validated as plain identifiers before they are spliced in.

use crate::config::SchemaConfig;

/// Prepared query text for one realm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQueries {
    pub find_user: String,
    pub roles_for_user: String,
}

impl SqlQueries {
    pub fn new(schema: &SchemaConfig, case_sensitive: bool) -> Result<Self, String> {
        schema.validate_identifiers()?;

        let predicate = if case_sensitive {
            format!("u.{} = $1", schema.username_column)
        } else {
            format!("lower(u.{}) = lower($1)", schema.username_column)
        };

        let find_user = format!(
            "SELECT u.{id} AS id, u.{username} AS username, u.{password} AS password_hash \
             FROM {table} u WHERE {predicate} LIMIT 2",
            id = schema.user_id_column,
            username = schema.username_column,
            password = schema.password_column,
            table = schema.user_table,
            predicate = predicate,
        );

        // LEFT JOIN so a join row pointing at a missing role shows up as NULL
        let roles_for_user = format!(
            "SELECT r.{role_name} AS role_name \
             FROM {user_roles} ur \
             LEFT JOIN {roles} r ON r.{role_id} = ur.{ur_role} \
             WHERE ur.{ur_user} = $1",
            role_name = schema.role_name_column,
            user_roles = schema.user_role_table,
            roles = schema.role_table,
            role_id = schema.role_id_column,
            ur_role = schema.user_role_role_column,
            ur_user = schema.user_role_user_column,
        );

        Ok(Self {
            find_user,
            roles_for_user,
        })
    }
}
