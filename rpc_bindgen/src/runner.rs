//! Per-file orchestration: validate, render, name.
//!
//! A [`Generator`] carries the process-wide, set-once configuration (import
//! manifest, output suffix, validation hook) and turns one schema file into
//! one named artifact. It holds no per-file state, so a driver may process
//! files in any order or in parallel.
use tracing::debug;

use crate::error::{Error, Result};
use crate::naming;
use crate::render;
use crate::schema::{FileSchema, Import};

/// Suffix substituted for the input file's extension.
pub const OUTPUT_SUFFIX: &str = "rpc.rs";

/// The fixed import manifest rendered into every generated file that
/// declares services.
pub fn default_imports() -> Vec<Import> {
    vec![
        Import::std("std::sync::Arc"),
        Import::external("async_trait::async_trait"),
    ]
}

/// Validation hook invoked once per schema before rendering.
pub type CheckFn = Box<dyn Fn(&FileSchema) -> anyhow::Result<()> + Send + Sync>;

/// The rendered output for one input file. Ownership passes to the caller,
/// which is responsible for writing it out.
#[derive(Clone, Debug)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}

pub struct Generator {
    imports: Vec<Import>,
    output_suffix: String,
    check: CheckFn,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(default_imports(), OUTPUT_SUFFIX)
    }
}

impl Generator {
    pub fn new(imports: Vec<Import>, output_suffix: impl Into<String>) -> Self {
        Self {
            imports,
            output_suffix: output_suffix.into(),
            check: Box::new(|_| Ok(())),
        }
    }

    /// Replaces the no-op validation hook.
    pub fn with_check(
        mut self,
        check: impl Fn(&FileSchema) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.check = Box::new(check);
        self
    }

    /// Generates the binding artifact for one schema file.
    ///
    /// A hook rejection or render failure is terminal for this file and is
    /// never retried; no partial output is produced. Other files are
    /// unaffected.
    pub fn generate(&self, schema: &FileSchema) -> Result<GeneratedFile> {
        (self.check)(schema).map_err(|source| Error::CheckFailed {
            file: schema.name.clone(),
            source,
        })?;

        let content = render::render_file(schema, &self.imports)?;
        let name = naming::output_name(&schema.name, &self.output_suffix);
        debug!(
            file = %schema.name,
            services = schema.services.len(),
            "generated rpc bindings"
        );

        Ok(GeneratedFile { name, content })
    }
}
