// src/tasks/fonts.rs

use crate::errors::Result;
use crate::pipeline::Pipeline;
use crate::pipeline::glob::SourceGlobs;
use crate::pipeline::transforms::Dest;
use crate::tasks::{BuildContext, FONTS, TaskAction};

/// Mirrors the vendor font tree into the font output directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontsTask;

impl TaskAction for FontsTask {
    fn name(&self) -> &str {
        FONTS
    }

    fn sources(&self, ctx: &BuildContext) -> Result<SourceGlobs> {
        Ok(SourceGlobs::new(&ctx.config.sources().fonts)?)
    }

    fn pipeline(&self, ctx: &BuildContext) -> Pipeline {
        Pipeline::new().pipe(Dest::new(
            ctx.fs.clone(),
            ctx.resolve(&ctx.config.paths().font_out),
        ))
    }
}
