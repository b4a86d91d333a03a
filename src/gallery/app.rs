//! Gallery window using eframe/egui

use super::{Gallery, GalleryKey, ItemView, ScrollLock, Theme, UiConfig};
use crate::config::VistaConfig;
use crate::content::ImageDescriptor;
use crate::loader::{DecodedImage, DefaultFetcher, ImageFetcher, LoadScheduler, LoaderConfig, QueueStats};
use crate::network::NetworkStack;
use crate::utils::{Result, VistaError};
use crate::visibility::{Rect, VisibilityOptions};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, channel};
use tokio::runtime::Runtime;

type Listing = Result<Vec<ImageDescriptor>>;

/// Main gallery application
pub struct GalleryApp {
    /// UI configuration
    config: UiConfig,
    loader: LoaderConfig,
    visibility: VisibilityOptions,
    fetcher: Arc<dyn ImageFetcher>,
    /// Where the listing came from
    source: String,
    /// Pending listing fetch
    listing_receiver: Option<Receiver<Listing>>,
    listing_error: Option<String>,
    gallery: Option<Gallery>,
    scroll: ScrollLock,
    textures: HashMap<String, egui::TextureHandle>,
    // Declared last so the gallery shuts down before the runtime goes away
    runtime: Runtime,
}

impl GalleryApp {
    /// Create the application and start fetching the listing
    pub fn new(cc: &eframe::CreationContext<'_>, config: VistaConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("vista-loader")
            .build()?;

        let network = NetworkStack::new(config.loader.fetch_timeout())?;
        let source = config.content_source(network.clone())?;
        let label = source.describe();
        log::info!("listing gallery from {}", label);

        let (tx, rx) = channel::<Listing>();
        let ctx = cc.egui_ctx.clone();
        runtime.spawn(async move {
            let _ = tx.send(source.list_images().await);
            ctx.request_repaint();
        });

        Ok(Self {
            config: config.ui,
            loader: config.loader,
            visibility: config.visibility,
            fetcher: Arc::new(DefaultFetcher::new(network)),
            source: label,
            listing_receiver: Some(rx),
            listing_error: None,
            gallery: None,
            scroll: ScrollLock::new(),
            textures: HashMap::new(),
            runtime,
        })
    }

    /// Check for the listing and mount the gallery once it arrives
    fn poll_listing(&mut self, ctx: &egui::Context) {
        let Some(rx) = &self.listing_receiver else {
            return;
        };
        let Ok(listing) = rx.try_recv() else {
            return;
        };
        self.listing_receiver = None;

        match listing {
            Ok(images) => {
                let repaint = ctx.clone();
                let mut scheduler = LoadScheduler::new(&self.loader, Arc::clone(&self.fetcher))
                    .with_notifier(Arc::new(move || repaint.request_repaint()));
                scheduler.start(self.runtime.handle());
                self.gallery = Some(Gallery::new(images, scheduler, self.visibility, self.scroll.clone()));
            }
            Err(e) => {
                log::error!("failed to list gallery: {}", e);
                self.listing_error = Some(e.to_string());
            }
        }
    }

    /// Render the thumbnail grid
    fn render_grid(&mut self, ui: &mut egui::Ui) {
        let Some(gallery) = self.gallery.as_mut() else {
            return;
        };
        let size = self.config.thumbnail_size;
        let textures = &mut self.textures;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .enable_scrolling(!self.scroll.is_locked())
            .show(ui, |ui| {
                let viewport = to_rect(ui.clip_rect());
                ui.spacing_mut().item_spacing = egui::vec2(self.config.spacing, self.config.spacing);
                ui.horizontal_wrapped(|ui| {
                    for index in 0..gallery.len() {
                        let (rect, response) =
                            ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());
                        gallery.layout(index, to_rect(rect), Some(viewport));

                        let Some(view) = gallery.item_view(index) else {
                            continue;
                        };
                        let id = &gallery.images()[index].id;
                        paint_cell(ui, rect, id, &view, textures);

                        match view {
                            ItemView::Loaded { alt, .. } => {
                                let response = match alt {
                                    Some(alt) => response.on_hover_text(alt),
                                    None => response,
                                };
                                if response.clicked() {
                                    gallery.open(index);
                                }
                            }
                            ItemView::Failed { reason } => {
                                let hint = reason.unwrap_or_else(|| "Failed to load".to_string());
                                if response.on_hover_text(format!("{hint}\nClick to retry")).clicked() {
                                    gallery.retry(index);
                                }
                            }
                            ItemView::Placeholder | ItemView::Loading => {}
                        }
                    }
                });
            });
    }

    /// Render the lightbox overlay
    fn render_lightbox(&mut self, ctx: &egui::Context) {
        let Some(gallery) = self.gallery.as_mut() else {
            return;
        };
        let Some((index, image)) = gallery.current() else {
            return;
        };
        let id = image.id.clone();
        let alt = image.alt.clone();
        let view = gallery.item_view(index);
        let textures = &mut self.textures;

        let mut action = None;
        egui::Area::new(egui::Id::new("lightbox"))
            .order(egui::Order::Foreground)
            .fixed_pos(egui::Pos2::ZERO)
            .show(ctx, |ui| {
                let screen = ctx.screen_rect();
                let backdrop = ui.allocate_rect(screen, egui::Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(220));

                let frame = screen.shrink(64.0);
                match &view {
                    Some(ItemView::Loaded { image, .. }) => {
                        let texture = texture_for(ui.ctx(), textures, &id, image);
                        let fitted = fit_within(frame, image.width as f32, image.height as f32);
                        ui.allocate_rect(fitted, egui::Sense::click());
                        ui.painter().image(
                            texture.id(),
                            fitted,
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        );
                    }
                    _ => {
                        egui::Spinner::new().size(48.0).paint_at(
                            ui,
                            egui::Rect::from_center_size(frame.center(), egui::vec2(48.0, 48.0)),
                        );
                    }
                }

                if let Some(alt) = &alt {
                    ui.painter().text(
                        egui::pos2(screen.center().x, screen.bottom() - 32.0),
                        egui::Align2::CENTER_CENTER,
                        alt,
                        egui::FontId::proportional(16.0),
                        egui::Color32::WHITE,
                    );
                }

                let button = egui::vec2(40.0, 40.0);
                let close = egui::Rect::from_min_size(egui::pos2(screen.right() - 56.0, 16.0), button);
                let prev = egui::Rect::from_center_size(egui::pos2(32.0, screen.center().y), button);
                let next = egui::Rect::from_center_size(
                    egui::pos2(screen.right() - 32.0, screen.center().y),
                    button,
                );
                if ui.put(close, egui::Button::new("✕")).clicked() {
                    action = Some(GalleryKey::Escape);
                } else if ui.put(prev, egui::Button::new("◀")).clicked() {
                    action = Some(GalleryKey::Previous);
                } else if ui.put(next, egui::Button::new("▶")).clicked() {
                    action = Some(GalleryKey::Next);
                } else if backdrop.clicked() {
                    gallery.click_outside();
                }
            });

        if let Some(key) = action.or_else(|| pressed_key(ctx)) {
            gallery.handle_key(key);
        }
    }

    /// Render the empty / error / listing states
    fn render_content(&mut self, ui: &mut egui::Ui) {
        if let Some(error) = &self.listing_error {
            ui.centered_and_justified(|ui| {
                ui.colored_label(ui.visuals().error_fg_color, format!("Could not load the gallery: {error}"));
            });
        } else if self.listing_receiver.is_some() {
            ui.centered_and_justified(|ui| {
                ui.spinner();
            });
        } else if self.gallery.as_ref().is_none_or(Gallery::is_empty) {
            ui.vertical_centered(|ui| {
                ui.add_space(100.0);
                ui.heading("No images yet");
                ui.add_space(12.0);
                ui.label(format!("Nothing is published to the gallery at {}", self.source));
            });
        } else {
            self.render_grid(ui);
        }
    }
}

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme
        match self.config.theme {
            Theme::Light => ctx.set_visuals(egui::Visuals::light()),
            Theme::Dark => ctx.set_visuals(egui::Visuals::dark()),
            Theme::System => {}
        }

        self.poll_listing(ctx);

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| match &self.gallery {
                Some(gallery) => {
                    let stats = gallery.scheduler().stats();
                    if !gallery.scheduler().is_settled() {
                        ui.spinner();
                    }
                    ui.label(status_line(gallery.len(), &stats));
                }
                None => {
                    ui.label(format!("Source: {}", self.source));
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_content(ui);
        });

        self.render_lightbox(ctx);
    }
}

/// Paint one grid cell for its current view
fn paint_cell(
    ui: &egui::Ui,
    rect: egui::Rect,
    id: &str,
    view: &ItemView,
    textures: &mut HashMap<String, egui::TextureHandle>,
) {
    let visuals = ui.visuals();
    let painter = ui.painter();
    match view {
        ItemView::Placeholder => {
            painter.rect_filled(rect, 4.0, visuals.faint_bg_color);
        }
        ItemView::Loading => {
            painter.rect_filled(rect, 4.0, visuals.extreme_bg_color);
            egui::Spinner::new().paint_at(ui, rect.shrink(rect.width() * 0.4));
        }
        ItemView::Failed { .. } => {
            painter.rect_filled(rect, 4.0, visuals.extreme_bg_color);
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "⚠ Retry",
                egui::FontId::proportional(14.0),
                visuals.error_fg_color,
            );
        }
        ItemView::Loaded { image, .. } => {
            let texture = texture_for(ui.ctx(), textures, id, image);
            let uv = center_crop_uv(image.width as f32, image.height as f32);
            painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
        }
    }
}

/// Upload once, reuse afterwards
fn texture_for(
    ctx: &egui::Context,
    textures: &mut HashMap<String, egui::TextureHandle>,
    id: &str,
    image: &DecodedImage,
) -> egui::TextureHandle {
    textures
        .entry(id.to_string())
        .or_insert_with(|| {
            let pixels = egui::ColorImage::from_rgba_unmultiplied(
                [image.width as usize, image.height as usize],
                &image.pixels,
            );
            ctx.load_texture(format!("gallery-{id}"), pixels, egui::TextureOptions::LINEAR)
        })
        .clone()
}

fn pressed_key(ctx: &egui::Context) -> Option<GalleryKey> {
    ctx.input(|i| {
        if i.key_pressed(egui::Key::Escape) {
            Some(GalleryKey::Escape)
        } else if i.key_pressed(egui::Key::ArrowLeft) {
            Some(GalleryKey::Previous)
        } else if i.key_pressed(egui::Key::ArrowRight) {
            Some(GalleryKey::Next)
        } else {
            None
        }
    })
}

fn to_rect(rect: egui::Rect) -> Rect {
    Rect::new(rect.min.x, rect.min.y, rect.width(), rect.height())
}

/// UV window that crops the image to a centered square
fn center_crop_uv(width: f32, height: f32) -> egui::Rect {
    if width <= 0.0 || height <= 0.0 {
        return egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    }
    let (u, v) = if width > height {
        (height / width, 1.0)
    } else {
        (1.0, width / height)
    };
    egui::Rect::from_center_size(egui::pos2(0.5, 0.5), egui::vec2(u, v))
}

/// Largest rect with the image's aspect ratio centered in `frame`
fn fit_within(frame: egui::Rect, width: f32, height: f32) -> egui::Rect {
    if width <= 0.0 || height <= 0.0 {
        return frame;
    }
    let scale = (frame.width() / width).min(frame.height() / height);
    egui::Rect::from_center_size(frame.center(), egui::vec2(width * scale, height * scale))
}

fn status_line(total: usize, stats: &QueueStats) -> String {
    format!(
        "{} of {} loaded | {} failed | {}/{} in flight | {} queued",
        stats.loaded, total, stats.failed, stats.in_flight, stats.max_concurrent, stats.pending
    )
}

/// Run the gallery application
pub fn run(config: VistaConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.ui.window_width as f32, config.ui.window_height as f32])
            .with_min_inner_size([400.0, 300.0])
            .with_title("Vista Gallery"),
        ..Default::default()
    };

    eframe::run_native(
        "Vista Gallery",
        options,
        Box::new(|cc| Ok(Box::new(GalleryApp::new(cc, config)?))),
    )
    .map_err(|e| VistaError::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_crop_landscape() {
        let uv = center_crop_uv(400.0, 200.0);
        assert_eq!(uv.min, egui::pos2(0.25, 0.0));
        assert_eq!(uv.max, egui::pos2(0.75, 1.0));
    }

    #[test]
    fn test_center_crop_portrait_and_square() {
        let uv = center_crop_uv(100.0, 400.0);
        assert_eq!(uv.min.y, 0.375);
        assert_eq!(uv.max.y, 0.625);
        assert_eq!(center_crop_uv(50.0, 50.0), egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)));
    }

    #[test]
    fn test_fit_within_keeps_aspect() {
        let frame = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 600.0));
        let fitted = fit_within(frame, 1600.0, 400.0);
        assert_eq!(fitted.width(), 800.0);
        assert_eq!(fitted.height(), 200.0);
        assert_eq!(fitted.center(), frame.center());
    }

    #[test]
    fn test_egui_rect_conversion() {
        let rect = egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(30.0, 40.0));
        assert_eq!(to_rect(rect), Rect::new(10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn test_status_line() {
        let stats = QueueStats {
            pending: 3,
            in_flight: 2,
            max_concurrent: 4,
            loaded: 5,
            failed: 1,
        };
        assert_eq!(status_line(11, &stats), "5 of 11 loaded | 1 failed | 2/4 in flight | 3 queued");
    }

    #[test]
    fn test_ui_config_default() {
        let config = UiConfig::default();
        assert_eq!(config.window_width, 1280);
        assert_eq!(config.window_height, 720);
        assert_eq!(config.theme, Theme::System);
    }
}
