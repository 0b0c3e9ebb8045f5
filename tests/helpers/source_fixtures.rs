//! Common Trilogy sources for tests.

/// A key, a property of it, and a select referencing the key.
pub const KEY_PROPERTY_SELECT: &str = "key user_id int;\nproperty user_id.name string;\nselect user_id;\n";

/// Dotted reference with no declarations.
pub const DOTTED_SELECT: &str = "select user_id.name;\n";

/// Missing type in a declaration.
pub const UNPARSABLE: &str = "key user_id ;\n";

/// A model with a datasource so selects can be rendered.
pub const USERS_MODEL: &str = r#"key user_id int; # unique user
property user_id.name string;
metric user_count <- count(user_id);
root datasource users (
    id: user_id,
    name
)
grain (user_id)
address app.users;
"#;

/// [`USERS_MODEL`] followed by two runnable statements on lines 10 and 11.
pub const USERS_QUERIES: &str = r#"key user_id int; # unique user
property user_id.name string;
metric user_count <- count(user_id);
root datasource users (
    id: user_id,
    name
)
grain (user_id)
address app.users;
select name, user_count;
raw_sql('select 1');
"#;

/// Parses, but `missing` is never declared.
pub const UNRESOLVED_REFERENCE: &str = "key a int;\nselect a, missing;\n";
