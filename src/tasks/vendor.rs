// src/tasks/vendor.rs

use crate::errors::Result;
use crate::pipeline::Pipeline;
use crate::pipeline::glob::SourceGlobs;
use crate::pipeline::transforms::{Changed, Dest, Rename};
use crate::tasks::{BuildContext, LESSIFY_VENDOR, TaskAction};

/// Copies vendor CSS into the stylesheet library directory as `.less`, so
/// project stylesheets can `@import` it. Unchanged files are not rewritten.
#[derive(Debug, Clone, Copy, Default)]
pub struct LessifyVendorTask;

impl TaskAction for LessifyVendorTask {
    fn name(&self) -> &str {
        LESSIFY_VENDOR
    }

    fn sources(&self, ctx: &BuildContext) -> Result<SourceGlobs> {
        Ok(SourceGlobs::new(&ctx.config.sources().vendor_stylesheets)?)
    }

    fn pipeline(&self, ctx: &BuildContext) -> Pipeline {
        let paths = ctx.config.paths();
        let lib_dir = ctx.resolve(&paths.library_dir());
        let ext = paths.stylesheet_extension.clone();

        Pipeline::new()
            .pipe(Changed::new(ctx.fs.clone(), lib_dir.clone()).with_extension(ext.clone()))
            .pipe(Rename::extension(ext))
            .pipe(Dest::new(ctx.fs.clone(), lib_dir))
    }
}
