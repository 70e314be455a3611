use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::Serialize;

use crate::assets::load_image;
use crate::config::Config;
use crate::data::devices::DeviceModel;
use crate::foundation::error::{RefcardError, RefcardResult};
use crate::foundation::log::RequestLog;
use crate::model::{ContextToColours, OverlaysByProfile};
use crate::render::card::{CardEnv, CardJob, render_card};
use crate::render::text::FontLibrary;

/// One encoded card. `jpeg` is empty when its render task failed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RenderedCard {
    pub profile: String,
    pub image: String,
    #[serde(skip)]
    pub jpeg: Vec<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct RenderOutput {
    pub cards: Vec<RenderedCard>,
    pub total_bytes: usize,
}

/// Everything one request's render pass reads.
#[derive(Clone, Copy)]
pub struct RenderRequest<'a> {
    pub overlays: &'a OverlaysByProfile,
    pub colours: &'a ContextToColours,
    pub logo_id: &'a str,
    pub config: &'a Config,
    pub devices: &'a DeviceModel,
    pub fonts: &'a FontLibrary,
}

/// Parallel card renderer.
///
/// Shared state is read-only; each task gets its own canvas and text engine and
/// writes only to its own output slot.
pub struct CardRenderer {
    pool: rayon::ThreadPool,
}

impl CardRenderer {
    /// `threads` sizes the worker pool; `None` uses rayon's default.
    pub fn new(threads: Option<usize>) -> RefcardResult<Self> {
        Ok(Self {
            pool: build_thread_pool(threads)?,
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Render every (profile, image) pair, ordered by profile then image.
    ///
    /// A missing logo aborts the request and yields no cards.
    #[tracing::instrument(level = "debug", skip_all, fields(logo = req.logo_id))]
    pub fn render(&self, req: &RenderRequest<'_>, log: &RequestLog) -> RenderOutput {
        if req.overlays.is_empty() {
            return RenderOutput::default();
        }
        let logo_path = req.config.logo_path(req.logo_id);
        let logo = match load_image(&logo_path) {
            Ok(logo) => logo,
            Err(e) => {
                log.error(&format!("logo {}", logo_path.display()), &e);
                return RenderOutput::default();
            }
        };

        let jobs: Vec<CardJob<'_>> = req
            .overlays
            .iter()
            .flat_map(|(profile, images)| {
                images.iter().map(move |(image, overlays)| CardJob {
                    profile,
                    image,
                    overlays,
                })
            })
            .collect();
        let mut cards: Vec<RenderedCard> = jobs
            .iter()
            .map(|job| RenderedCard {
                profile: job.profile.to_owned(),
                image: job.image.to_owned(),
                jpeg: Vec::new(),
            })
            .collect();

        let env = CardEnv {
            config: req.config,
            devices: req.devices,
            fonts: req.fonts,
            logo: &logo,
            colours: req.colours,
            log,
        };
        let total = AtomicUsize::new(0);
        self.pool.install(|| {
            cards
                .par_iter_mut()
                .zip(jobs.par_iter())
                .for_each(|(slot, job)| match render_card(&env, job) {
                    Ok(jpeg) => {
                        tracing::debug!(
                            profile = job.profile,
                            image = job.image,
                            bytes = jpeg.len(),
                            "rendered card"
                        );
                        total.fetch_add(jpeg.len(), Ordering::Relaxed);
                        slot.jpeg = jpeg;
                    }
                    Err(e) => log.error(&format!("render {} ({})", job.image, job.profile), &e),
                });
        });

        RenderOutput {
            cards,
            total_bytes: total.into_inner(),
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> RefcardResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(RefcardError::validation("RenderThreads must be >= 1 when set"));
    }

    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("refcard-render-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| RefcardError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
