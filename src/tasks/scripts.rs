// src/tasks/scripts.rs

use crate::errors::Result;
use crate::pipeline::Pipeline;
use crate::pipeline::glob::SourceGlobs;
use crate::pipeline::transforms::{Concat, Dest, SourceMapInit, SourceMapWrite};
use crate::tasks::{BuildContext, SCRIPTS, TaskAction};

/// Bundles scripts in glob order.
///
/// Release: sourcemap-init -> minify -> concat -> sourcemap-write -> dest.
/// Development: beautify -> concat -> dest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptsTask;

impl TaskAction for ScriptsTask {
    fn name(&self) -> &str {
        SCRIPTS
    }

    fn sources(&self, ctx: &BuildContext) -> Result<SourceGlobs> {
        Ok(SourceGlobs::new(&ctx.config.sources().scripts)?)
    }

    fn pipeline(&self, ctx: &BuildContext) -> Pipeline {
        let t = &ctx.transforms;
        let cfg = &ctx.config;
        let release = ctx.mode.is_release();

        Pipeline::new()
            .pipe_if(release, SourceMapInit::new(ctx.root.clone()))
            .pipe_either(release, t.js_minify.clone(), t.js_beautify.clone())
            .pipe(Concat::new(&cfg.output().js_bundle))
            .pipe_if(release, SourceMapWrite::new(cfg.output().source_map))
            .pipe(Dest::new(ctx.fs.clone(), ctx.resolve(&cfg.paths().js_out)))
    }
}
