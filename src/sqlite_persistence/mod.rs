mod versioned_schema;

pub use versioned_schema::{
    open_versioned_db, open_versioned_in_memory, Column, ForeignKey, ForeignKeyOnChange, SqlType,
    Table, VersionedSchema, BASE_DB_VERSION, DEFAULT_TIMESTAMP,
};
