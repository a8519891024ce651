//! Built-in resource schemas for the content API.
//!
//! Each admin page is one of these descriptors plus rendering; all the
//! list/modal/delete logic lives in the generic controller.

use serde_json::{json, Value};

use super::{FieldSpec, ResourceDescriptor};

pub fn blogs() -> ResourceDescriptor {
    ResourceDescriptor::new(
        "blogs",
        "/blogs",
        "_id",
        vec![
            FieldSpec::required("title"),
            FieldSpec::required("content"),
            FieldSpec::optional("coverImage"),
            FieldSpec::optional("tags").with_default(json!([])),
            FieldSpec::optional("published").with_default(Value::Bool(false)),
        ],
    )
}

pub fn projects() -> ResourceDescriptor {
    ResourceDescriptor::new(
        "projects",
        "/projects",
        "_id",
        vec![
            FieldSpec::required("title"),
            FieldSpec::required("description"),
            FieldSpec::optional("image"),
            FieldSpec::optional("liveUrl"),
            FieldSpec::optional("repoUrl"),
            FieldSpec::optional("technologies").with_default(json!([])),
        ],
    )
}

pub fn testimonials() -> ResourceDescriptor {
    ResourceDescriptor::new(
        "testimonials",
        "/testimonials",
        "_id",
        vec![
            FieldSpec::required("author"),
            FieldSpec::required("quote"),
            FieldSpec::optional("role"),
            FieldSpec::optional("avatar"),
        ],
    )
}

pub fn contacts() -> ResourceDescriptor {
    ResourceDescriptor::new(
        "contacts",
        "/contacts",
        "_id",
        vec![
            FieldSpec::required("name"),
            FieldSpec::required("email"),
            FieldSpec::optional("phone"),
            FieldSpec::optional("message"),
        ],
    )
}

pub fn services() -> ResourceDescriptor {
    ResourceDescriptor::new(
        "services",
        "/services",
        "_id",
        vec![
            FieldSpec::required("name"),
            FieldSpec::required("description"),
            FieldSpec::optional("icon"),
        ],
    )
}

/// Site settings live behind a relational backend and use plain `id`.
pub fn settings() -> ResourceDescriptor {
    ResourceDescriptor::new(
        "settings",
        "/settings",
        "id",
        vec![
            FieldSpec::required("key"),
            FieldSpec::required("value"),
        ],
    )
}

pub fn all() -> Vec<ResourceDescriptor> {
    vec![
        blogs(),
        projects(),
        testimonials(),
        contacts(),
        services(),
        settings(),
    ]
}

/// Look up a built-in descriptor by resource name.
pub fn by_name(name: &str) -> Option<ResourceDescriptor> {
    all().into_iter().find(|d| d.name == name)
}
