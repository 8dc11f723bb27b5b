//! Builder style entry points, one module per operation.
//!
//! When no options are given, the method follows the carrier's file extension
//! (see [`Method::for_path`]) with that method's default options.

pub mod capacity;
pub mod embed;
pub mod extract;

use std::path::Path;

use crate::{CodecOptions, Method};

pub(crate) fn resolve_options(options: Option<CodecOptions>, carrier: &Path) -> CodecOptions {
    options.unwrap_or_else(|| {
        let method = Method::for_path(carrier);
        log::debug!("no options given, using {method} for {carrier:?}");
        method.into()
    })
}
