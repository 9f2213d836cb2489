//! The editing session: one explicit context object owning the layers, the
//! active tool, the history log and the background workers.
//!
//! All pixel mutation happens on the thread that owns the [`Editor`].
//! Worker results are only applied from [`Editor::poll_workers`] and
//! [`Editor::finish_pending`], one at a time.

use std::sync::Arc;

use ndarray::Array3;
use rslabel_raster::{IndexKind, NormType, RawScene};
use web_time::Duration;

use crate::config::AppConfig;
use crate::constants::{FIRST_DRAWING_LAYER, MAX_PEN_SIZE, SOURCE_IMAGE_LAYER};
use crate::error::EditorError;
use crate::export;
use crate::history::{HistoryAction, HistoryConfig, HistoryLog};
use crate::keybindings::{Action, KeyBindings, KeyState};
use crate::kmeans;
use crate::layers::{ColorSample, LayerProperty, LayerRegistry, is_drawing_layer};
use crate::model::ClassTable;
use crate::pixel_buffer::PixelBuffer;
use crate::tools::{ActiveTool, FillRequest, ToolKind, brush, magnetic};
use crate::workers::{Job, JobOutput, JobResult, WorkerPool};

#[cfg(test)]
mod tests;

/// An interactive labelling session.
pub struct Editor {
    registry: LayerRegistry,
    tool: ActiveTool,
    history: HistoryLog,
    classes: ClassTable,
    selected_class: usize,
    pen_size: u32,
    tolerance: f64,
    normalization: NormType,
    kmeans_seed: u64,
    default_k: usize,
    hover_color: String,
    pointer_down: bool,
    last_xy: Option<(i32, i32)>,
    scene: Option<Arc<RawScene>>,
    width: u32,
    height: u32,
    bindings: KeyBindings,
    keys: KeyState,
    workers: WorkerPool,
}

impl Editor {
    /// Create a session configured from `config`. Spawns the worker threads.
    pub fn new(config: &AppConfig) -> Result<Self, EditorError> {
        let prefs = &config.preferences;
        let workers = WorkerPool::spawn(Duration::from_millis(prefs.worker_timeout_ms))?;

        Ok(Self {
            registry: LayerRegistry::new(),
            tool: ActiveTool::default(),
            history: HistoryLog::with_config(HistoryConfig {
                max_history: prefs.history_capacity,
            }),
            classes: config.class_table(),
            selected_class: 0,
            pen_size: prefs.pen_size.clamp(1, MAX_PEN_SIZE),
            tolerance: prefs.bucket_tolerance.max(0.0),
            normalization: prefs.default_normalization,
            kmeans_seed: prefs.kmeans_seed,
            default_k: prefs.default_k,
            hover_color: crate::constants::DEFAULT_HEX_COLOR.to_string(),
            pointer_down: false,
            last_xy: None,
            scene: None,
            width: 0,
            height: 0,
            bindings: config.key_bindings(),
            keys: KeyState::new(),
            workers,
        })
    }

    // ------------------------------------------------------------------
    // Scene lifecycle
    // ------------------------------------------------------------------

    /// Load a raw scene and render its layers.
    ///
    /// The bands for the Source Image and every requested composite are
    /// checked first; on error the current session is left untouched. The
    /// Source Image and composites are rendered in the background.
    pub fn load_scene(
        &mut self,
        scene: RawScene,
        composites: &[IndexKind],
    ) -> Result<(), EditorError> {
        scene.true_color_bands()?;
        for &kind in composites {
            scene.index_bands(kind)?;
        }

        let scene = Arc::new(scene);
        self.reset(scene.width(), scene.height());
        self.scene = Some(Arc::clone(&scene));

        self.registry.add_layer(
            SOURCE_IMAGE_LAYER,
            PixelBuffer::new(self.width, self.height),
            false,
        );
        self.workers.submit(
            Job::Normalize {
                scene: Arc::clone(&scene),
                norm: self.normalization,
            },
            SOURCE_IMAGE_LAYER,
        );

        self.add_drawing_layer();

        for &kind in composites {
            self.registry
                .add_layer(kind.name(), PixelBuffer::new(self.width, self.height), true);
            self.workers.submit(
                Job::Index {
                    scene: Arc::clone(&scene),
                    kind,
                },
                kind.name(),
            );
        }

        log::info!(
            "Loaded {} scene {}x{} with {} composites",
            scene.satellite().name(),
            self.width,
            self.height,
            composites.len()
        );
        Ok(())
    }

    /// Start a session on an already rendered image (no raw bands).
    pub fn load_source_image(&mut self, image: PixelBuffer) {
        let (width, height) = image.dimensions();
        self.reset(width, height);
        self.registry.add_layer(SOURCE_IMAGE_LAYER, image, false);
        self.add_drawing_layer();
        log::info!("Loaded source image {}x{}", width, height);
    }

    fn reset(&mut self, width: u32, height: u32) {
        self.workers.cancel_all();
        self.registry.reset();
        self.history.clear();
        self.tool = ActiveTool::default();
        self.keys = KeyState::new();
        self.pointer_down = false;
        self.last_xy = None;
        self.scene = None;
        self.width = width;
        self.height = height;
    }

    /// Create the next `Drawing Layer N`, select it and record its baseline.
    pub fn add_drawing_layer(&mut self) -> String {
        let name = self.registry.next_drawing_layer_name();
        let buffer = PixelBuffer::new(self.width, self.height);
        self.history.seed_undeletable(&name, buffer.clone());
        self.registry.add_layer(&name, buffer, false);
        self.registry.select(&name);
        log::debug!("Editor: created '{}'", name);
        name
    }

    /// Register a decoded overlay image (legend, reference map) as a
    /// non-drawing layer, scaled to the scene size.
    pub fn add_image_layer(&mut self, name: &str, bytes: &[u8]) -> Result<(), EditorError> {
        let mut image = image::load_from_memory(bytes)?.to_rgba8();
        if self.width > 0 && self.height > 0 && image.dimensions() != (self.width, self.height) {
            image = image::imageops::resize(
                &image,
                self.width,
                self.height,
                image::imageops::FilterType::Nearest,
            );
        }
        if self.width == 0 || self.height == 0 {
            (self.width, self.height) = image.dimensions();
        }

        self.registry
            .add_layer(name, PixelBuffer::from_image(image), false);
        log::info!("Editor: added image layer '{}'", name);
        Ok(())
    }

    /// Remove a layer and everything history holds for it.
    pub fn remove_layer(&mut self, name: &str) -> Result<(), EditorError> {
        self.registry
            .remove_layer(name)
            .ok_or_else(|| EditorError::unknown_layer(name))?;
        self.history.forget_layer(name);
        if self.tool.draw_layer() == Some(name) {
            self.tool = ActiveTool::Pan;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tools and pointer input
    // ------------------------------------------------------------------

    /// Make `kind` the only active tool.
    pub fn activate_tool(&mut self, kind: ToolKind) {
        let selected = self
            .registry
            .selected_drawing_layer()
            .unwrap_or(FIRST_DRAWING_LAYER)
            .to_string();
        self.tool = self.tool.activate(kind, &selected);
        self.pointer_down = false;
        log::debug!("Editor: activated {} ({:?})", kind, self.tool.cursor());
    }

    /// Select a layer. Selecting a non-drawing layer with `close_menus`
    /// drops back to panning.
    pub fn select_layer(&mut self, name: &str, close_menus: bool) -> bool {
        if !self.registry.select(name) {
            return false;
        }
        if close_menus && !is_drawing_layer(name) {
            self.tool = ActiveTool::Pan;
        }
        true
    }

    /// Layer the current tool paints into.
    pub fn pointer_target(&self) -> Option<String> {
        self.tool
            .draw_layer()
            .or_else(|| self.registry.selected_drawing_layer())
            .map(str::to_string)
    }

    /// Pointer pressed at scene position `(px, py)`.
    pub fn pointer_down(&mut self, px: f32, py: f32) {
        self.update_hover(px, py);
        self.pointer_down = true;

        if let ActiveTool::Bucket { draw_layer } = &self.tool {
            let draw_layer = draw_layer.clone();
            let start = (px.floor() as i32, py.floor() as i32);
            self.last_xy = Some(start);
            self.bucket_fill(start, &draw_layer);
            return;
        }

        let origin = brush::brush_origin(px, py, self.pen_size);
        self.last_xy = Some(origin);

        if self.tool.wand_menu_open() {
            let draw_layer = self
                .registry
                .selected_drawing_layer()
                .unwrap_or(FIRST_DRAWING_LAYER)
                .to_string();
            log::debug!(
                "Editor: wand picked {} on '{}'",
                self.hover_color,
                draw_layer
            );
            self.tool = ActiveTool::Wand {
                draw_layer,
                overwrite: self.hover_color.clone(),
            };
            return;
        }

        self.stroke(origin);
    }

    /// Pointer moved to `(px, py)`; paints while the pointer is down.
    pub fn pointer_move(&mut self, px: f32, py: f32) {
        self.update_hover(px, py);
        if self.pointer_down {
            self.stroke(brush::brush_origin(px, py, self.pen_size));
        }
    }

    /// Pointer released; completes the gesture and records a checkpoint.
    pub fn pointer_up(&mut self) {
        if !self.pointer_down {
            return;
        }
        self.pointer_down = false;

        if !self.tool.checkpoints_on_release() {
            return;
        }
        let Some(layer) = self.pointer_target() else {
            return;
        };
        let action = match self.tool {
            ActiveTool::Eraser => HistoryAction::ErasePixel,
            ActiveTool::Wand { .. } => HistoryAction::MagicDraw,
            ActiveTool::GapDrawer { .. } => HistoryAction::AbDraw,
            ActiveTool::MagneticDrawer { .. } => HistoryAction::TabDraw,
            _ => HistoryAction::DrawPixel,
        };
        self.checkpoint(&layer, action);
    }

    fn update_hover(&mut self, px: f32, py: f32) {
        self.hover_color = self
            .registry
            .color_at(px.floor() as i32, py.floor() as i32)
            .hex;
    }

    fn checkpoint(&mut self, layer: &str, action: HistoryAction) {
        match self.registry.buffer(layer) {
            Some(buffer) => {
                let snapshot = buffer.clone();
                self.history.push_checkpoint(layer, snapshot, action);
            }
            None => log::warn!("Editor: no layer '{}' to checkpoint", layer),
        }
    }

    fn selected_visible_drawing_layer(&self) -> Option<String> {
        let name = self.registry.selected_drawing_layer()?;
        let visible = self.registry.settings(name)?.visible;
        visible.then(|| name.to_string())
    }

    fn stroke(&mut self, (x, y): (i32, i32)) {
        let pen = self.pen_size;
        let rgb = self.class_color();

        match self.tool.clone() {
            ActiveTool::PlainDraw => {
                let Some(layer) = self.selected_visible_drawing_layer() else {
                    return;
                };
                if let Some(buffer) = self.registry.buffer_mut(&layer) {
                    brush::draw_square(buffer, x, y, pen, rgb);
                }
            }
            ActiveTool::Eraser => {
                let Some(layer) = self.selected_visible_drawing_layer() else {
                    return;
                };
                if let Some(buffer) = self.registry.buffer_mut(&layer) {
                    brush::erase_square(buffer, x, y, pen);
                }
            }
            ActiveTool::GapDrawer { draw_layer } => {
                brush::gap_fill(&mut self.registry, &draw_layer, x, y, pen, rgb);
            }
            ActiveTool::Wand {
                draw_layer,
                overwrite,
            } => match self.registry.buffer_mut(&draw_layer) {
                Some(buffer) => {
                    brush::wand_overwrite(buffer, x, y, pen, &overwrite, rgb);
                }
                None => log::warn!("Editor: wand layer '{}' not found", draw_layer),
            },
            ActiveTool::MagneticDrawer { draw_layer } => {
                let Some(source) = self.registry.buffer(SOURCE_IMAGE_LAYER) else {
                    log::warn!("Editor: magnetic drawer needs a Source Image");
                    return;
                };
                let point = magnetic::snap_point(source, x, y, pen, self.last_xy);
                match self.registry.buffer_mut(&draw_layer) {
                    Some(buffer) => {
                        brush::draw_square(buffer, point.0, point.1, pen, rgb);
                        self.last_xy = Some(point);
                    }
                    None => log::warn!("Editor: magnetic layer '{}' not found", draw_layer),
                }
            }
            ActiveTool::Pan
            | ActiveTool::WandMenu
            | ActiveTool::Bucket { .. }
            | ActiveTool::MapView => {}
        }
    }

    fn bucket_fill(&mut self, start: (i32, i32), draw_layer: &str) {
        let ColorSample { layer, hex } = self.registry.color_at(start.0, start.1);
        let Some(source) = self.registry.layer(&layer) else {
            log::warn!("Editor: bucket source '{}' not found", layer);
            return;
        };
        let Some(target) = self.registry.buffer(draw_layer) else {
            log::warn!("Editor: bucket target '{}' not found", draw_layer);
            return;
        };

        log::debug!(
            "Editor: bucket at {:?} on '{}' ({}) into '{}'",
            start,
            layer,
            hex,
            draw_layer
        );
        let request = FillRequest {
            source: source.buffer.clone(),
            source_origin: source.origin,
            source_is_drawing_layer: is_drawing_layer(&layer),
            target: target.clone(),
            start,
            fill_color: self.class_color(),
            tolerance: self.tolerance,
        };
        self.workers
            .submit(Job::BucketFill(Box::new(request)), draw_layer);
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Undo the last checkpoint. Returns the affected layer.
    pub fn undo(&mut self) -> Option<String> {
        self.history.undo(&mut self.registry)
    }

    /// Redo the last undone checkpoint. Returns the affected layer.
    pub fn redo(&mut self) -> Option<String> {
        self.history.redo(&mut self.registry)
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Set a layer's opacity in percent (clamped to 100).
    pub fn set_opacity(&mut self, name: &str, opacity: u8) -> Result<(), EditorError> {
        let settings = self
            .registry
            .settings_mut(name)
            .ok_or_else(|| EditorError::unknown_layer(name))?;
        settings.opacity = opacity.min(100);
        Ok(())
    }

    /// Show or hide a layer. Returns the new visibility.
    pub fn toggle_visibility(&mut self, name: &str) -> Result<bool, EditorError> {
        let settings = self
            .registry
            .settings_mut(name)
            .ok_or_else(|| EditorError::unknown_layer(name))?;
        settings.visible = !settings.visible;
        Ok(settings.visible)
    }

    /// Open or close a layer's discrete menu. Returns the new state.
    pub fn toggle_discrete_menu(&mut self, name: &str) -> Result<bool, EditorError> {
        let settings = self
            .registry
            .settings_mut(name)
            .ok_or_else(|| EditorError::unknown_layer(name))?;
        settings.discrete_menu_open = !settings.discrete_menu_open;
        settings.discrete_active = settings.discrete_menu_open;
        Ok(settings.discrete_menu_open)
    }

    /// Open or close a layer's k-means menu. Returns the new state.
    pub fn toggle_kmeans_menu(&mut self, name: &str) -> Result<bool, EditorError> {
        let settings = self
            .registry
            .settings_mut(name)
            .ok_or_else(|| EditorError::unknown_layer(name))?;
        settings.kmeans_menu_open = !settings.kmeans_menu_open;
        Ok(settings.kmeans_menu_open)
    }

    /// Set the brush edge length, clamped to `1..=MAX_PEN_SIZE`.
    pub fn set_pen_size(&mut self, size: u32) {
        self.pen_size = size.clamp(1, MAX_PEN_SIZE);
    }

    /// Grow the brush by one pixel.
    pub fn increase_pen_size(&mut self) {
        self.set_pen_size(self.pen_size.saturating_add(1));
    }

    /// Shrink the brush by one pixel.
    pub fn decrease_pen_size(&mut self) {
        self.set_pen_size(self.pen_size.saturating_sub(1));
    }

    /// Set the bucket tolerance (negative values become 0).
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance.max(0.0);
    }

    /// Select the paint class by display index.
    pub fn select_class(&mut self, index: usize) -> bool {
        if index >= self.classes.len() {
            log::warn!("Editor: no class at index {}", index);
            return false;
        }
        self.selected_class = index;
        true
    }

    /// Advance to the next normalization and re-render the Source Image.
    pub fn toggle_normalization(&mut self) -> NormType {
        self.normalization = self.normalization.next();
        log::debug!("Editor: normalization {}", self.normalization.name());
        if let Some(scene) = &self.scene {
            self.workers.submit(
                Job::Normalize {
                    scene: Arc::clone(scene),
                    norm: self.normalization,
                },
                SOURCE_IMAGE_LAYER,
            );
        }
        self.normalization
    }

    /// Cluster a layer's colours into `k` (or the configured default) colours.
    pub fn discretize(&mut self, name: &str, k: Option<usize>) -> Result<(), EditorError> {
        let layer = self
            .registry
            .layer(name)
            .ok_or_else(|| EditorError::unknown_layer(name))?;
        if !layer.settings.discretizable {
            log::warn!("Editor: '{}' is not marked discretizable", name);
        }
        let job = Job::Kmeans {
            pixels: kmeans::buffer_pixels(&layer.buffer),
            k: k.unwrap_or(self.default_k),
            seed: self.kmeans_seed,
        };
        self.workers.submit(job, name);
        Ok(())
    }

    /// Discretize the topmost discretizable layer not yet clustered.
    /// Returns the layer chosen, if any.
    pub fn discretize_active(&mut self, k: Option<usize>) -> Option<String> {
        let name = self
            .registry
            .active_layer(
                &[LayerProperty::Discretizable],
                &[LayerProperty::KmeansClustered],
            )
            .filter(|name| !is_drawing_layer(name))?
            .to_string();
        self.discretize(&name, k).ok()?;
        Some(name)
    }

    // ------------------------------------------------------------------
    // Workers
    // ------------------------------------------------------------------

    /// Apply every worker result that has arrived. Returns how many were applied.
    pub fn poll_workers(&mut self) -> usize {
        let results = self.workers.poll();
        self.apply_results(results)
    }

    /// Block until outstanding jobs finish (or `max_wait` passes) and apply them.
    pub fn finish_pending(&mut self, max_wait: Duration) -> usize {
        let results = self.workers.wait(max_wait);
        self.apply_results(results)
    }

    /// Number of jobs still running.
    pub fn pending_jobs(&self) -> usize {
        self.workers.pending_count()
    }

    fn apply_results(&mut self, results: Vec<JobResult>) -> usize {
        results
            .into_iter()
            .filter(|result| self.apply_result(result))
            .count()
    }

    fn apply_result(&mut self, result: &JobResult) -> bool {
        let output = match &result.output {
            Ok(output) => output,
            Err(e) => {
                log::error!("{} job for '{}' failed: {}", result.kind.name(), result.target, e);
                return false;
            }
        };
        if !self.registry.contains(&result.target) {
            log::warn!(
                "Dropping {} result: layer '{}' is gone",
                result.kind.name(),
                result.target
            );
            return false;
        }

        match output {
            JobOutput::Image(raster) => {
                let buffer =
                    match PixelBuffer::from_rgba(raster.width, raster.height, raster.data.clone()) {
                        Ok(buffer) => buffer,
                        Err(e) => {
                            log::error!("Rendered '{}' is malformed: {}", result.target, e);
                            return false;
                        }
                    };
                if let Some(target) = self.registry.buffer_mut(&result.target) {
                    *target = buffer;
                }
                log::debug!("Editor: rendered '{}'", result.target);
            }
            JobOutput::Buffer(buffer) => {
                if let Some(target) = self.registry.buffer_mut(&result.target) {
                    target.copy_from(buffer);
                }
                self.checkpoint(&result.target, HistoryAction::BucketFill);
            }
            JobOutput::Clusters(clustering) => {
                let applied = self
                    .registry
                    .buffer_mut(&result.target)
                    .is_some_and(|buffer| kmeans::apply(buffer, clustering));
                if !applied {
                    return false;
                }
                if let Some(settings) = self.registry.settings_mut(&result.target) {
                    settings.kmeans_clustered = true;
                    settings.kmeans_menu_open = false;
                }
                log::debug!(
                    "Editor: '{}' discretized into {} colours",
                    result.target,
                    clustering.centroids.len()
                );
            }
        }
        true
    }

    // ------------------------------------------------------------------
    // Hotkeys
    // ------------------------------------------------------------------

    /// Key pressed; runs the bound action, if any.
    pub fn key_down(&mut self, key: &str) -> Option<Action> {
        let action = self.keys.key_down(key, &self.bindings)?;
        self.perform_action(action).then_some(action)
    }

    /// Key released.
    pub fn key_up(&mut self, key: &str) {
        self.keys.key_up(key);
    }

    /// Run a hotkey action. Ignored (returns false) while the wand menu or
    /// the map view is open.
    pub fn perform_action(&mut self, action: Action) -> bool {
        if self.tool.wand_menu_open() || self.tool.is(ToolKind::MapView) {
            log::debug!("Editor: {} ignored while a menu is open", action.name());
            return false;
        }

        if let Some(kind) = action.tool() {
            self.activate_tool(kind);
            return true;
        }
        match action {
            Action::ToggleNormalization => {
                self.toggle_normalization();
            }
            Action::Undo => {
                self.undo();
            }
            Action::Redo => {
                self.redo();
            }
            Action::DecreasePenSize => self.decrease_pen_size(),
            Action::IncreasePenSize => self.increase_pen_size(),
            _ => {}
        }
        true
    }

    // ------------------------------------------------------------------
    // Output and accessors
    // ------------------------------------------------------------------

    /// Class-id label array for the given layers.
    pub fn export(&self, layers: &[&str]) -> Result<Array3<u8>, EditorError> {
        export::label_array(&self.registry, &self.classes, layers)
    }

    /// Composite of all visible layers.
    pub fn flatten(&self) -> PixelBuffer {
        self.registry.flatten(self.width, self.height)
    }

    /// Topmost opaque colour at scene coordinates.
    pub fn color_at(&self, x: i32, y: i32) -> ColorSample {
        self.registry.color_at(x, y)
    }

    /// Colour of the selected paint class.
    pub fn class_color(&self) -> [u8; 3] {
        self.classes
            .get(self.selected_class)
            .map_or([0, 0, 0], |class| class.color)
    }

    /// Layers of the session.
    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    /// Active tool state.
    pub fn tool(&self) -> &ActiveTool {
        &self.tool
    }

    /// History log.
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Label classes.
    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    /// Brush edge length.
    pub fn pen_size(&self) -> u32 {
        self.pen_size
    }

    /// Bucket tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Current Source Image normalization.
    pub fn normalization(&self) -> NormType {
        self.normalization
    }

    /// Hex colour under the pointer.
    pub fn hover_color(&self) -> &str {
        &self.hover_color
    }

    /// Scene dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw scene, if one is loaded.
    pub fn scene(&self) -> Option<&RawScene> {
        self.scene.as_deref()
    }
}
