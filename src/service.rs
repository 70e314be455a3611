use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::config::Config;
use crate::data::devices::DeviceModel;
use crate::data::registry::GameRegistry;
use crate::foundation::error::RefcardResult;
use crate::foundation::log::{LogEntry, RequestLog};
use crate::games::GameKind;
use crate::model::{binds_summary, generate_context_colours};
use crate::overlay::populate_image_overlays;
use crate::render::{CardRenderer, FontLibrary, RenderRequest, RenderedCard};

/// Result of one card-generation request.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RefCardResponse {
    pub cards: Vec<RenderedCard>,
    pub total_bytes: usize,
    pub log: Vec<LogEntry>,
}

impl RefCardResponse {
    /// Cards whose render task produced bytes.
    pub fn rendered(&self) -> impl Iterator<Item = &RenderedCard> {
        self.cards.iter().filter(|c| !c.jpeg.is_empty())
    }
}

/// Long-lived request handler.
///
/// Configuration, the device model and fonts are loaded once; per-title game data is
/// loaded on first use. Every request gets fresh binds, overlays and log.
pub struct RefCardService {
    config: Config,
    devices: DeviceModel,
    fonts: FontLibrary,
    games: GameRegistry,
    renderer: CardRenderer,
}

impl RefCardService {
    /// Load the configuration file and everything it points at.
    pub fn load(config_path: impl AsRef<Path>) -> RefcardResult<Self> {
        let config = Config::from_path(config_path)?;
        let devices = DeviceModel::from_path(&config.devices_file)?;
        let fonts = FontLibrary::load(&config.fonts_dir, config.font_names())?;
        Self::from_parts(config, devices, fonts)
    }

    /// Assemble a service from already loaded pieces.
    pub fn from_parts(
        config: Config,
        devices: DeviceModel,
        fonts: FontLibrary,
    ) -> RefcardResult<Self> {
        config.validate()?;
        let games = GameRegistry::new(config.game_data_dir.clone());
        let renderer = CardRenderer::new(config.render_threads)?;
        tracing::info!(
            app = %config.app_name,
            version = %config.version,
            devices = devices.inputs.len(),
            render_threads = renderer.threads(),
            "refcard service ready"
        );
        Ok(Self {
            config,
            devices,
            fonts,
            games,
            renderer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn devices(&self) -> &DeviceModel {
        &self.devices
    }

    /// Turn uploaded binding files into reference cards.
    ///
    /// Only an unavailable title fails the request. Everything else is recorded in
    /// the response log and drops the smallest unit it concerns.
    #[tracing::instrument(level = "info", skip(self, files), fields(files = files.len()))]
    pub fn generate(&self, kind: GameKind, files: &[Vec<u8>]) -> RefcardResult<RefCardResponse> {
        let adapter = self.games.get(kind)?;
        let log = RequestLog::new();
        let started = Instant::now();
        log.msg(format!(
            "processing {} {} file(s)",
            files.len(),
            kind.description()
        ));

        let parsed = adapter.parse(files, &self.devices, &log);
        if self.config.verbose_output {
            tracing::debug!("parsed binds:\n{}", binds_summary(&parsed.binds));
        }

        let colours = generate_context_colours(&parsed.contexts, &self.config.alternate_colours);
        let overlays = populate_image_overlays(
            &parsed,
            &self.devices,
            adapter.as_ref(),
            self.config.debug_output,
            &log,
        );

        let out = self.renderer.render(
            &RenderRequest {
                overlays: &overlays,
                colours: &colours,
                logo_id: adapter.logo(),
                config: &self.config,
                devices: &self.devices,
                fonts: &self.fonts,
            },
            &log,
        );
        log.msg(format!(
            "generated {} image(s), {} bytes in {:.2}s",
            out.cards.iter().filter(|c| !c.jpeg.is_empty()).count(),
            out.total_bytes,
            started.elapsed().as_secs_f64()
        ));

        Ok(RefCardResponse {
            cards: out.cards,
            total_bytes: out.total_bytes,
            log: log.into_entries(),
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/service.rs"]
mod tests;
