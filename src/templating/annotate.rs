//! Provenance annotations on rendered objects.
//!
//! When enabled on a renderer, every produced object is tagged with three
//! annotations recording where it came from. The values are authoritative:
//! a template that sets the same keys itself is overwritten.
//!
//! | Annotation | Value |
//! |------------|-------|
//! | [`ANNOTATION_SOURCE_TYPE`] | [`RENDERER_NAME`] |
//! | [`ANNOTATION_SOURCE_PATH`] | selector pattern of the source |
//! | [`ANNOTATION_SOURCE_FILE`] | template that produced the object |

use crate::constants::{
    ANNOTATION_SOURCE_FILE, ANNOTATION_SOURCE_PATH, ANNOTATION_SOURCE_TYPE, RENDERER_NAME,
};
use crate::core::Object;

/// Upsert the provenance annotations on every object.
pub fn annotate(objects: &mut [Object], pattern: &str, template: &str) {
    for object in objects {
        object.set_annotation(ANNOTATION_SOURCE_TYPE, RENDERER_NAME);
        object.set_annotation(ANNOTATION_SOURCE_PATH, pattern);
        object.set_annotation(ANNOTATION_SOURCE_FILE, template);
    }
}
