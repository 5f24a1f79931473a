pub mod console_api;
pub mod export;
pub mod field_registry;
pub mod field_schema;
pub mod member_form;
