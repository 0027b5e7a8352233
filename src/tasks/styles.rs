// src/tasks/styles.rs

use crate::errors::Result;
use crate::pipeline::Pipeline;
use crate::pipeline::glob::SourceGlobs;
use crate::pipeline::transforms::{Concat, Dest};
use crate::tasks::{BuildContext, STYLES, TaskAction};

/// Compiles project stylesheets into one CSS bundle.
///
/// compile -> (release: minify) -> autoprefix -> concat -> dest
#[derive(Debug, Clone, Copy, Default)]
pub struct StylesTask;

impl TaskAction for StylesTask {
    fn name(&self) -> &str {
        STYLES
    }

    fn sources(&self, ctx: &BuildContext) -> Result<SourceGlobs> {
        Ok(SourceGlobs::new(&ctx.config.sources().stylesheets)?)
    }

    fn pipeline(&self, ctx: &BuildContext) -> Pipeline {
        let t = &ctx.transforms;
        let cfg = &ctx.config;

        Pipeline::new()
            .pipe(t.stylesheet_compile.clone())
            .pipe_if(ctx.mode.is_release(), t.css_minify.clone())
            .pipe(t.autoprefix.clone())
            .pipe(Concat::new(&cfg.output().css_bundle))
            .pipe(Dest::new(ctx.fs.clone(), ctx.resolve(&cfg.paths().css_out)))
    }
}
