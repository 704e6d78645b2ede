use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};

use crate::sites::{self, SiteRecord, SortDirection, SortKey};

mod camera;
mod interaction;
mod render_utils;
mod ring;
mod sim;
mod ui;
mod view;

use camera::Camera;
use interaction::DragController;
use render_utils::Theme;
use sim::{SimParams, Simulation};

pub struct AtlasApp {
    sites_path: PathBuf,
    initial_sort: (SortKey, SortDirection),
    state: AppState,
    reload_rx: Option<Receiver<Result<Vec<SiteRecord>, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Vec<SiteRecord>, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

/// Everything one loaded ring needs: the records, the current layout engine,
/// the camera and the interaction state. The engine, camera framing and drag
/// state are replaced wholesale whenever the topology is rebuilt.
struct ViewModel {
    sites: Vec<SiteRecord>,
    sorted_sites: Vec<SiteRecord>,
    sort_key: SortKey,
    sort_direction: SortDirection,
    search: String,
    params: SimParams,
    sim: Simulation,
    camera: Camera,
    drag: DragController,
    theme: Theme,
    hovered_site: Option<String>,
    hovered_group: Option<String>,
    graph_dirty: bool,
}

impl AtlasApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        sites_path: PathBuf,
        sort_key: SortKey,
        sort_direction: SortDirection,
    ) -> Self {
        let state = Self::start_load(sites_path.clone());
        Self {
            sites_path,
            initial_sort: (sort_key, sort_direction),
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(sites_path: PathBuf) -> Receiver<Result<Vec<SiteRecord>, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = sites::load_sites(&sites_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(sites_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(sites_path),
        }
    }

    fn ready_state(&self, sites: Vec<SiteRecord>) -> AppState {
        let (sort_key, sort_direction) = self.initial_sort;
        AppState::Ready(Box::new(ViewModel::new(sites, sort_key, sort_direction)))
    }
}

impl eframe::App for AtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(sites) => self.ready_state(sites),
                        Err(error) => {
                            log::error!("site load failed: {error}");
                            AppState::Error(error)
                        }
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading web ring...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the web ring");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.sites_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.sites_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.sites_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(sites) => self.ready_state(sites),
                                Err(error) => {
                                    log::error!("site reload failed: {error}");
                                    AppState::Error(error)
                                }
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
